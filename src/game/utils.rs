use chess::{Board, Color, Piece, Rank, Square, ALL_SQUARES};
use std::str::FromStr;

use crate::error::MoveError;
use crate::models::{PieceKind, Side};

/// Convert a chess color to a side
pub fn side_from_color(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

/// Convert a chess piece to its wire kind
pub fn kind_from_piece(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

/// Parse an algebraic square such as `e4`
pub fn parse_square(square: &str) -> Result<Square, MoveError> {
    Square::from_str(&square.trim().to_lowercase())
        .map_err(|_| MoveError::InvalidSquare(square.to_string()))
}

/// Parse the promotion letter a client sent. Clients that do not ask get a queen.
pub fn parse_promotion(promotion: Option<&str>) -> Result<Piece, MoveError> {
    let Some(letter) = promotion else {
        return Ok(Piece::Queen);
    };
    match letter.trim().to_lowercase().as_str() {
        "q" => Ok(Piece::Queen),
        "r" => Ok(Piece::Rook),
        "b" => Ok(Piece::Bishop),
        "n" => Ok(Piece::Knight),
        _ => Err(MoveError::InvalidPromotion(letter.to_string())),
    }
}

/// Whether a pawn landing on `square` must promote
pub fn is_promotion_rank(square: Square) -> bool {
    matches!(square.get_rank(), Rank::First | Rank::Eighth)
}

#[derive(Default)]
struct Material {
    pawns: u32,
    knights: u32,
    bishops: u32,
    rooks: u32,
    queens: u32,
    bishop_on_light: bool,
    bishop_on_dark: bool,
}

impl Material {
    fn bare(&self) -> bool {
        self.pawns + self.knights + self.bishops + self.rooks + self.queens == 0
    }

    fn only_minor(&self, knights: u32, bishops: u32) -> bool {
        self.pawns == 0
            && self.rooks == 0
            && self.queens == 0
            && self.knights == knights
            && self.bishops == bishops
    }
}

/// Check if the board has insufficient material for checkmate
pub fn has_insufficient_material(board: &Board) -> bool {
    let mut white = Material::default();
    let mut black = Material::default();

    for square in ALL_SQUARES {
        let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) else {
            continue;
        };
        let side = match color {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        match piece {
            Piece::Pawn => side.pawns += 1,
            Piece::Knight => side.knights += 1,
            Piece::Bishop => {
                side.bishops += 1;
                if (square.get_rank().to_index() + square.get_file().to_index()) % 2 == 0 {
                    side.bishop_on_dark = true;
                } else {
                    side.bishop_on_light = true;
                }
            }
            Piece::Rook => side.rooks += 1,
            Piece::Queen => side.queens += 1,
            Piece::King => {}
        }
    }

    // King vs king, or a lone minor piece against a bare king
    if (white.bare() || black.bare())
        && [&white, &black]
            .iter()
            .all(|m| m.bare() || m.only_minor(1, 0) || m.only_minor(0, 1))
    {
        return true;
    }

    // Bishop vs bishop on the same colour
    if white.only_minor(0, 1) && black.only_minor(0, 1) {
        return (white.bishop_on_light && black.bishop_on_light)
            || (white.bishop_on_dark && black.bishop_on_dark);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_str(fen).unwrap()
    }

    #[test]
    fn test_parse_square() {
        assert_eq!(parse_square("e4").unwrap(), Square::E4);
        assert_eq!(parse_square("E4").unwrap(), Square::E4);
        assert_eq!(
            parse_square("z9").unwrap_err(),
            MoveError::InvalidSquare("z9".to_string())
        );
    }

    #[test]
    fn test_parse_promotion() {
        assert_eq!(parse_promotion(None).unwrap(), Piece::Queen);
        assert_eq!(parse_promotion(Some("N")).unwrap(), Piece::Knight);
        assert!(parse_promotion(Some("k")).is_err());
    }

    #[test]
    fn test_insufficient_material() {
        assert!(has_insufficient_material(&board("4k3/8/8/8/8/8/8/4K3 w - - 0 1")));
        assert!(has_insufficient_material(&board("4k3/8/8/8/8/8/8/4KN2 w - - 0 1")));
        assert!(has_insufficient_material(&board("4kb2/8/8/8/8/8/8/4K3 w - - 0 1")));
        // c1 and f8 are both dark squares
        assert!(has_insufficient_material(&board("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1")));
        assert!(!has_insufficient_material(&board("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1")));
        assert!(!has_insufficient_material(&board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1")));
        assert!(!has_insufficient_material(&board("4k3/4p3/8/8/8/8/8/4K3 w - - 0 1")));
        assert!(!has_insufficient_material(&Board::default()));
    }
}
