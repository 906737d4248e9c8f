use actix::Addr;

use crate::websocket::GameServer;

/// Application state shared between HTTP workers
pub struct AppState {
    pub server: Addr<GameServer>,
}
