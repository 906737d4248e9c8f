use serde::{Deserialize, Serialize};

/// Identifier handed to every websocket connection
pub type ConnectionId = String;

/// One of the two controlling roles at the table
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Seat name used in seat and winner payloads
    pub fn name(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

/// A seat is either empty or held by exactly one connection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Seat {
    #[default]
    Vacant,
    Occupied {
        connection: ConnectionId,
        name: String,
    },
}

impl Seat {
    pub fn is_occupied(&self) -> bool {
        matches!(self, Seat::Occupied { .. })
    }

    pub fn is_held_by(&self, id: &str) -> bool {
        matches!(self, Seat::Occupied { connection, .. } if connection == id)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Seat::Occupied { name, .. } => Some(name),
            Seat::Vacant => None,
        }
    }
}

/// Both seats at the table
#[derive(Debug, Clone, Default)]
pub struct Seats {
    white: Seat,
    black: Seat,
}

impl Seats {
    pub fn get(&self, side: Side) -> &Seat {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Seat {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    /// The side held by this connection, if any
    pub fn side_of(&self, id: &str) -> Option<Side> {
        if self.white.is_held_by(id) {
            Some(Side::White)
        } else if self.black.is_held_by(id) {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn is_full(&self) -> bool {
        self.white.is_occupied() && self.black.is_occupied()
    }

    pub fn is_empty(&self) -> bool {
        !self.white.is_occupied() && !self.black.is_occupied()
    }

    /// Vacates the seat held by `id` and returns which side it was
    pub fn vacate(&mut self, id: &str) -> Option<Side> {
        let side = self.side_of(id)?;
        *self.get_mut(side) = Seat::Vacant;
        Some(side)
    }

    /// Display name for the winner payload, falling back to the seat name
    pub fn display_name(&self, side: Side) -> String {
        self.get(side)
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| side.name().to_string())
    }
}

/// Why a game stopped accepting moves
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Checkmate,
    Draw,
    Timeout,
    Disconnect,
}

/// Kind of a chess piece as the wire and the capture table see it
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    #[serde(rename = "p")]
    Pawn,
    #[serde(rename = "n")]
    Knight,
    #[serde(rename = "b")]
    Bishop,
    #[serde(rename = "r")]
    Rook,
    #[serde(rename = "q")]
    Queen,
    #[serde(rename = "k")]
    King,
}

impl PieceKind {
    /// Material value used for the captured-piece tally
    pub fn value(self) -> u32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }
}

/// A piece standing on some square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceInfo {
    pub kind: PieceKind,
    pub side: Side,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CapturedPiece {
    pub piece: PieceKind,
    pub color: Side,
    pub value: u32,
}

impl From<PieceInfo> for CapturedPiece {
    fn from(info: PieceInfo) -> Self {
        CapturedPiece {
            piece: info.kind,
            color: info.side,
            value: info.kind.value(),
        }
    }
}

/// Captured material, keyed by the side that did the capturing
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    pub white: Vec<CapturedPiece>,
    pub black: Vec<CapturedPiece>,
}

impl CapturedPieces {
    pub fn record(&mut self, captured_by: Side, piece: CapturedPiece) {
        match captured_by {
            Side::White => self.white.push(piece),
            Side::Black => self.black.push(piece),
        }
    }
}

/// Summary of the last accepted move
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LastMove {
    pub from: String,
    pub to: String,
    pub piece: PieceKind,
    pub color: Side,
}

/// The single live game at the table
#[derive(Debug, Clone)]
pub struct GameState<P> {
    pub position: P,
    pub side_to_move: Side,
    pub started: bool,
    pub ended: bool,
    pub winner: Option<Side>,
    pub end_reason: Option<EndReason>,
    pub last_move: Option<LastMove>,
    pub captured: CapturedPieces,
    pub in_check: bool,
}

impl<P> GameState<P> {
    pub fn new(position: P) -> Self {
        GameState {
            position,
            side_to_move: Side::White,
            started: false,
            ended: false,
            winner: None,
            end_reason: None,
            last_move: None,
            captured: CapturedPieces::default(),
            in_check: false,
        }
    }

    /// Freezes the game; `winner` is `None` for a draw
    pub fn finish(&mut self, winner: Option<Side>, reason: EndReason) {
        self.ended = true;
        self.winner = winner;
        self.end_reason = Some(reason);
    }

    pub fn is_in_progress(&self) -> bool {
        self.started && !self.ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(id: &str, name: &str) -> Seat {
        Seat::Occupied {
            connection: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_seats_track_connections() {
        let mut seats = Seats::default();
        assert!(seats.is_empty());

        *seats.get_mut(Side::White) = occupied("a", "Alice");
        *seats.get_mut(Side::Black) = occupied("b", "Bob");
        assert!(seats.is_full());
        assert_eq!(seats.side_of("b"), Some(Side::Black));
        assert_eq!(seats.side_of("c"), None);

        assert_eq!(seats.vacate("a"), Some(Side::White));
        assert_eq!(seats.vacate("a"), None);
        assert!(!seats.get(Side::White).is_occupied());
        assert_eq!(seats.display_name(Side::White), "white");
        assert_eq!(seats.display_name(Side::Black), "Bob");
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(PieceKind::Pawn.value(), 1);
        assert_eq!(PieceKind::Knight.value(), 3);
        assert_eq!(PieceKind::Bishop.value(), 3);
        assert_eq!(PieceKind::Rook.value(), 5);
        assert_eq!(PieceKind::Queen.value(), 9);
        assert_eq!(PieceKind::King.value(), 0);
    }

    #[test]
    fn test_captured_piece_wire_shape() {
        let piece = CapturedPiece::from(PieceInfo {
            kind: PieceKind::Knight,
            side: Side::Black,
        });
        let json = serde_json::to_value(&piece).unwrap();
        assert_eq!(json, serde_json::json!({"piece": "n", "color": "b", "value": 3}));
    }
}
