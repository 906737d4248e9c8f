pub mod handler;
pub mod server;

pub use handler::{ws_index, ChessWebSocket};
pub use server::GameServer;
