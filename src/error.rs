use serde_json::Value;
use thiserror::Error;

/// Reasons a submitted move is turned away. Every variant is reported to the
/// sender as `invalidMove`; the distinction only shows up in the logs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("game is already over")]
    GameOver,

    #[error("connection does not hold a seat")]
    NotSeated,

    #[error("not your turn")]
    NotYourTurn,

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("no piece on {0}")]
    NoPiece(String),

    #[error("illegal move {from}-{to}")]
    Illegal { from: String, to: String },
}

/// A text frame that could not be turned into a [`ClientMessage`](crate::models::ClientMessage)
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("invalid message format: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("invalid move payload: {source}")]
    MalformedMove {
        payload: Value,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        assert_eq!(MoveError::NotYourTurn.to_string(), "not your turn");
        assert_eq!(MoveError::InvalidSquare("z9".to_string()).to_string(), "invalid square: z9");
        assert_eq!(
            MoveError::Illegal {
                from: "e2".to_string(),
                to: "e5".to_string()
            }
            .to_string(),
            "illegal move e2-e5"
        );
    }
}
