//! Move legality, backed by the `chess` crate.
//!
//! The table never looks inside a position. It asks the [`RulesEngine`] to
//! apply a move and gets back the next position plus enough classification
//! (check, checkmate, draw) to drive the session.

use chess::{Board, BoardStatus, ChessMove, Game, Piece};
use std::str::FromStr;

use crate::error::MoveError;
use crate::game::utils::{
    has_insufficient_material, is_promotion_rank, kind_from_piece, parse_promotion, parse_square,
    side_from_color,
};
use crate::models::{MoveRequest, PieceInfo, PieceKind, Side};

/// How the game stands after a move. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Ongoing,
    Checkmate,
    Draw,
}

/// Result of an accepted move
#[derive(Debug, Clone)]
pub struct MoveOutcome<P> {
    pub position: P,
    /// Canonical lowercase squares of the move
    pub from: String,
    pub to: String,
    pub mover: Side,
    pub captured: Option<PieceInfo>,
    pub moved_piece: PieceKind,
    pub side_to_move: Side,
    pub is_check: bool,
    pub terminal: Terminal,
}

pub trait RulesEngine {
    type Position: Clone;

    fn initial_position(&self) -> Self::Position;

    /// Validates `request` against `position` and returns the position after it.
    /// `position` itself is never modified.
    fn apply_move(
        &self,
        position: &Self::Position,
        request: &MoveRequest,
    ) -> Result<MoveOutcome<Self::Position>, MoveError>;

    /// Text encoding broadcast to viewers
    fn encode(&self, position: &Self::Position) -> String;

    fn piece_at(&self, position: &Self::Position, square: &str) -> Option<PieceInfo>;
}

/// Standard chess rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl ChessRules {
    pub fn position_from_fen(fen: &str) -> Result<Game, chess::Error> {
        Board::from_str(fen).map(Game::new_with_board)
    }

    fn classify(game: &Game) -> Terminal {
        let board = game.current_position();
        match board.status() {
            BoardStatus::Checkmate => Terminal::Checkmate,
            BoardStatus::Stalemate => Terminal::Draw,
            BoardStatus::Ongoing => {
                // can_declare_draw covers threefold repetition and the fifty-move rule
                if has_insufficient_material(&board) || game.can_declare_draw() {
                    Terminal::Draw
                } else {
                    Terminal::Ongoing
                }
            }
        }
    }
}

impl RulesEngine for ChessRules {
    type Position = Game;

    fn initial_position(&self) -> Game {
        Game::new()
    }

    fn apply_move(&self, position: &Game, request: &MoveRequest) -> Result<MoveOutcome<Game>, MoveError> {
        let board = position.current_position();
        let from = parse_square(&request.from)?;
        let to = parse_square(&request.to)?;

        let (Some(piece), Some(color)) = (board.piece_on(from), board.color_on(from)) else {
            return Err(MoveError::NoPiece(request.from.clone()));
        };

        // Promotion letters on ordinary moves are ignored
        let promotion = if piece == Piece::Pawn && is_promotion_rank(to) {
            Some(parse_promotion(request.promotion.as_deref())?)
        } else {
            None
        };

        let mover = side_from_color(color);
        let captured = match (board.piece_on(to), board.color_on(to)) {
            (Some(target), Some(target_color)) => Some(PieceInfo {
                kind: kind_from_piece(target),
                side: side_from_color(target_color),
            }),
            // a pawn changing file onto an empty square takes en passant
            _ if piece == Piece::Pawn && from.get_file() != to.get_file() => Some(PieceInfo {
                kind: PieceKind::Pawn,
                side: mover.opponent(),
            }),
            _ => None,
        };

        let mut next = position.clone();
        if !next.make_move(ChessMove::new(from, to, promotion)) {
            return Err(MoveError::Illegal {
                from: request.from.clone(),
                to: request.to.clone(),
            });
        }

        let board = next.current_position();
        let terminal = Self::classify(&next);
        Ok(MoveOutcome {
            from: from.to_string(),
            to: to.to_string(),
            mover,
            captured,
            moved_piece: kind_from_piece(piece),
            side_to_move: side_from_color(board.side_to_move()),
            is_check: board.checkers().popcnt() > 0,
            terminal,
            position: next,
        })
    }

    fn encode(&self, position: &Game) -> String {
        position.current_position().to_string()
    }

    fn piece_at(&self, position: &Game, square: &str) -> Option<PieceInfo> {
        let square = parse_square(square).ok()?;
        let board = position.current_position();
        Some(PieceInfo {
            kind: kind_from_piece(board.piece_on(square)?),
            side: side_from_color(board.color_on(square)?),
        })
    }
}
