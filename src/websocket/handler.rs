use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::InboundError;
use crate::models::{AppState, ChessWebSocketMessage, ClientMessage, ServerMessage};
use crate::websocket::server::{ClientEvent, Connect, Disconnect, GameServer, MalformedMove};

/// WebSocket actor for one viewer or player
pub struct ChessWebSocket {
    pub id: String,
    pub server: Addr<GameServer>,
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("WebSocket connection started: {}", self.id);
        self.server.do_send(Connect {
            id: self.id.clone(),
            addr: ctx.address().recipient(),
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        info!("WebSocket connection closed: {}", self.id);
        self.server.do_send(Disconnect { id: self.id.clone() });
        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                debug!("Received text message from {}: {}", self.id, text);
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.reply(ctx, ServerMessage::Error("Binary messages are not supported".to_string()));
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

impl ChessWebSocket {
    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match ClientMessage::parse(text) {
            Ok(message) => {
                self.server.do_send(ClientEvent {
                    id: self.id.clone(),
                    message,
                });
            }
            Err(InboundError::MalformedMove { payload, source }) => {
                warn!("Malformed move from {}: {}", self.id, source);
                self.server.do_send(MalformedMove {
                    id: self.id.clone(),
                    payload,
                });
            }
            Err(e) => {
                warn!("Error parsing client message from {}: {}", self.id, e);
                self.reply(ctx, ServerMessage::Error(e.to_string()));
            }
        }
    }

    /// Answers this connection directly, without going through the game server
    fn reply(&self, ctx: &mut ws::WebsocketContext<Self>, message: ServerMessage) {
        match serde_json::to_string(&message) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Error serializing {} reply: {}", message.name(), e),
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", id);

    let ws = ChessWebSocket {
        id,
        server: app_state.server.clone(),
    };

    ws::start(ws, &req, stream)
}
