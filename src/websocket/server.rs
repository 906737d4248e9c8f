use actix::prelude::*;
use actix_rt::task::JoinHandle;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::TableConfig;
use crate::game::rules::ChessRules;
use crate::game::session::{Gateway, Table};
use crate::game::timer::TimerScheduler;
use crate::models::{ChessWebSocketMessage, ClientMessage, ConnectionId, ServerMessage};

/// A websocket connection opened
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: ConnectionId,
    pub addr: Recipient<ChessWebSocketMessage>,
}

/// A websocket connection closed
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: ConnectionId,
}

/// A parsed frame from a connection
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientEvent {
    pub id: ConnectionId,
    pub message: ClientMessage,
}

/// A `move` frame whose payload did not parse
#[derive(Message)]
#[rtype(result = "()")]
pub struct MalformedMove {
    pub id: ConnectionId,
    pub payload: Value,
}

/// The turn budget for `generation` ran out
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct TurnExpired {
    pub generation: u64,
}

/// Live websocket connections, addressed by connection id
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: HashMap<ConnectionId, Recipient<ChessWebSocketMessage>>,
}

impl ConnectionRegistry {
    pub fn register(&mut self, id: ConnectionId, addr: Recipient<ChessWebSocketMessage>) {
        self.sessions.insert(id, addr);
    }

    pub fn unregister(&mut self, id: &str) {
        self.sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn encode(message: &ServerMessage) -> Option<String> {
        match serde_json::to_string(message) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Error serializing {} message: {}", message.name(), e);
                None
            }
        }
    }
}

impl Gateway for ConnectionRegistry {
    fn send_to(&mut self, connection: &str, message: ServerMessage) {
        let Some(addr) = self.sessions.get(connection) else {
            debug!("Session not found for connection ID: {}", connection);
            return;
        };
        if let Some(text) = Self::encode(&message) {
            debug!("Sending {} to {}", message.name(), connection);
            addr.do_send(ChessWebSocketMessage(text));
        }
    }

    fn broadcast(&mut self, message: ServerMessage) {
        let Some(text) = Self::encode(&message) else {
            return;
        };
        debug!("Broadcasting {} to {} connections", message.name(), self.sessions.len());
        for addr in self.sessions.values() {
            addr.do_send(ChessWebSocketMessage(text.clone()));
        }
    }
}

/// Schedules turn expiry as a sleeping task that reports back to the server's mailbox
pub struct MailboxTimer {
    server: Recipient<TurnExpired>,
    pending: Option<JoinHandle<()>>,
}

impl MailboxTimer {
    pub fn new(server: Recipient<TurnExpired>) -> Self {
        MailboxTimer {
            server,
            pending: None,
        }
    }
}

impl TimerScheduler for MailboxTimer {
    fn schedule(&mut self, generation: u64, after: Duration) {
        self.cancel();
        let server = self.server.clone();
        self.pending = Some(actix_rt::spawn(async move {
            actix_rt::time::sleep(after).await;
            server.do_send(TurnExpired { generation });
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

pub type LiveTable = Table<ChessRules, ConnectionRegistry, MailboxTimer>;

/// Owns the table. Every mutation of game, seat and chat state passes
/// through this actor's mailbox one message at a time.
pub struct GameServer {
    table: LiveTable,
}

impl GameServer {
    pub fn spawn(config: TableConfig) -> Addr<GameServer> {
        GameServer::create(move |ctx| {
            let timer = MailboxTimer::new(ctx.address().recipient());
            GameServer {
                table: Table::new(ChessRules, ConnectionRegistry::default(), timer, config),
            }
        })
    }
}

impl Actor for GameServer {
    type Context = Context<Self>;

    fn started(&mut self, _: &mut Self::Context) {
        info!(
            "Game server started with a {:?} turn budget",
            self.table.timer().budget()
        );
    }
}

impl Handler<Connect> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Self::Context) {
        self.table.gateway_mut().register(msg.id.clone(), msg.addr);
        info!(
            "Connection {} registered, total active sessions: {}",
            msg.id,
            self.table.gateway().len()
        );
        self.table.connect(&msg.id);
    }
}

impl Handler<Disconnect> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Self::Context) {
        self.table.gateway_mut().unregister(&msg.id);
        self.table.disconnect(&msg.id);
        info!(
            "Connection {} removed, total active sessions: {}, table is {:?}",
            msg.id,
            self.table.gateway().len(),
            self.table.phase()
        );
        if self.table.gateway().is_empty() {
            debug!("No connections left");
        }
    }
}

impl Handler<MalformedMove> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: MalformedMove, _: &mut Self::Context) {
        self.table.reject_malformed_move(&msg.id, msg.payload);
    }
}

impl Handler<ClientEvent> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: ClientEvent, _: &mut Self::Context) {
        debug!("Event from {}: {:?}", msg.id, msg.message);
        self.table.handle_message(&msg.id, msg.message);
    }
}

impl Handler<TurnExpired> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: TurnExpired, _: &mut Self::Context) {
        self.table.turn_expired(msg.generation);
    }
}
