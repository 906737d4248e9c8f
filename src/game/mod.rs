pub mod chat;
pub mod rules;
pub mod session;
pub mod timer;
pub mod utils;
