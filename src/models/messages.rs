use actix::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InboundError;
use crate::game::chat::ChatMessage;
use crate::models::game_state::{CapturedPieces, EndReason, LastMove, Side};

/// A move as submitted by a client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

/// Message sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "message_type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Join { name: String },
    Move(MoveRequest),
    ChatPost { body: String },
    RequestNewGame,
}

impl ClientMessage {
    /// Parses a text frame. A `move` frame whose payload does not fit
    /// [`MoveRequest`] is reported separately so it can be echoed back.
    pub fn parse(text: &str) -> Result<ClientMessage, InboundError> {
        let raw: Value = serde_json::from_str(text).map_err(InboundError::Malformed)?;
        let is_move = raw.get("message_type").and_then(Value::as_str) == Some("move");
        let payload = raw.get("data").cloned().unwrap_or(Value::Null);

        serde_json::from_value(raw).map_err(|source| {
            if is_move {
                InboundError::MalformedMove { payload, source }
            } else {
                InboundError::Malformed(source)
            }
        })
    }
}

/// Seat occupancy as broadcast after every seat change
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SeatNames {
    pub white: Option<String>,
    pub black: Option<String>,
}

/// Names of both players once the game begins
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerNames {
    pub white: String,
    pub black: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Assigned {
    pub side: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub last_move: Option<LastMove>,
    pub captured_pieces: CapturedPieces,
    pub side_to_move: Side,
    pub in_check: bool,
    pub ended: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerUpdate {
    pub budget_ms: u64,
    pub start_timestamp: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameOver {
    pub winner: Option<String>,
    pub reason: EndReason,
    pub winner_name: Option<String>,
}

/// The rejected move, echoed the way the client sent it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum MoveEcho {
    Parsed(MoveRequest),
    Raw(Value),
}

/// Message sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "message_type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Role(Side),
    Assigned(Assigned),
    Spectator,
    SeatsUpdate(SeatNames),
    GameStarted(PlayerNames),
    Move(MoveRequest),
    Position(String),
    StateSnapshot(StateSnapshot),
    InvalidMove(MoveEcho),
    TimerUpdate(TimerUpdate),
    GameOver(GameOver),
    GameReset,
    ChatMessage(ChatMessage),
    ChatHistory(Vec<ChatMessage>),
    Error(String),
}

impl ServerMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::Role(_) => "role",
            ServerMessage::Assigned(_) => "assigned",
            ServerMessage::Spectator => "spectator",
            ServerMessage::SeatsUpdate(_) => "seatsUpdate",
            ServerMessage::GameStarted(_) => "gameStarted",
            ServerMessage::Move(_) => "move",
            ServerMessage::Position(_) => "position",
            ServerMessage::StateSnapshot(_) => "stateSnapshot",
            ServerMessage::InvalidMove(_) => "invalidMove",
            ServerMessage::TimerUpdate(_) => "timerUpdate",
            ServerMessage::GameOver(_) => "gameOver",
            ServerMessage::GameReset => "gameReset",
            ServerMessage::ChatMessage(_) => "chatMessage",
            ServerMessage::ChatHistory(_) => "chatHistory",
            ServerMessage::Error(_) => "error",
        }
    }
}

/// Serialized frame pushed to a websocket actor
#[derive(Message)]
#[rtype(result = "()")]
pub struct ChessWebSocketMessage(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_client_messages() {
        let join = ClientMessage::parse(r#"{"message_type":"join","data":{"name":"Alice"}}"#).unwrap();
        assert_eq!(join, ClientMessage::Join { name: "Alice".to_string() });

        let mv = ClientMessage::parse(
            r#"{"message_type":"move","data":{"from":"e2","to":"e4","promotion":"q"}}"#,
        )
        .unwrap();
        assert_eq!(
            mv,
            ClientMessage::Move(MoveRequest {
                from: "e2".to_string(),
                to: "e4".to_string(),
                promotion: Some("q".to_string()),
            })
        );

        let reset = ClientMessage::parse(r#"{"message_type":"requestNewGame"}"#).unwrap();
        assert_eq!(reset, ClientMessage::RequestNewGame);
    }

    #[test]
    fn test_malformed_move_keeps_payload() {
        let err = ClientMessage::parse(r#"{"message_type":"move","data":{"from":"e2"}}"#).unwrap_err();
        match err {
            InboundError::MalformedMove { payload, .. } => assert_eq!(payload, json!({"from": "e2"})),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ClientMessage::parse("not json").unwrap_err();
        assert!(matches!(err, InboundError::Malformed(_)));

        let err = ClientMessage::parse(r#"{"message_type":"resign"}"#).unwrap_err();
        assert!(matches!(err, InboundError::Malformed(_)));
    }

    #[test]
    fn test_server_message_wire_shape() {
        let msg = ServerMessage::SeatsUpdate(SeatNames {
            white: Some("Alice".to_string()),
            black: None,
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"message_type": "seatsUpdate", "data": {"white": "Alice", "black": null}})
        );

        let msg = ServerMessage::TimerUpdate(TimerUpdate {
            budget_ms: 60_000,
            start_timestamp: 42,
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"message_type": "timerUpdate", "data": {"budgetMs": 60000, "startTimestamp": 42}})
        );

        let msg = ServerMessage::GameOver(GameOver {
            winner: None,
            reason: EndReason::Draw,
            winner_name: None,
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"message_type": "gameOver", "data": {"winner": null, "reason": "draw", "winnerName": null}})
        );

        assert_eq!(
            serde_json::to_value(&ServerMessage::GameReset).unwrap(),
            json!({"message_type": "gameReset"})
        );
        assert_eq!(
            serde_json::to_value(&ServerMessage::Role(Side::Black)).unwrap(),
            json!({"message_type": "role", "data": "b"})
        );
    }

    #[test]
    fn test_invalid_move_echoes_raw_payload() {
        let msg = ServerMessage::InvalidMove(MoveEcho::Raw(json!({"from": "e2"})));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"message_type": "invalidMove", "data": {"from": "e2"}})
        );
    }
}
