//! Two-player chess table served over websockets.
//!
//! Two connections take the white and black seats, everyone else watches.
//! The [`game::session::Table`] owns seats, the game, the turn clock and chat,
//! and lives inside the [`websocket::GameServer`] actor.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;
pub mod websocket;
