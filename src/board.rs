use std::collections::HashSet;

use thiserror::Error;

use crate::movegen::promotes;
use crate::settings::GameSettings;
use crate::types::{Color, Move, Piece, PieceId, Position};

const EMPTY_CELL: u8 = 0;
const BLACK_CELL: u8 = 1;
const WHITE_CELL: u8 = 2;
const KING_OFFSET: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("piece {0} is placed off the board at {1}")]
    OutOfBounds(PieceId, Position),
    #[error("square {0} holds more than one piece")]
    Occupied(Position),
    #[error("piece id {0} is used more than once")]
    DuplicateId(PieceId),
}

/// Dam Haji board: a square grid and the pieces standing on it.
///
/// Boards are never edited in place. State changes produce a new board, which
/// keeps history snapshots independent of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: u8,
    pieces: Vec<Piece>,
}

impl Board {
    /// Creates the opening layout.
    ///
    /// Black fills rows upward from row 0 and White downward from the last row,
    /// each row starting at column 1 on even rows and column 0 on odd rows, until
    /// `pieces_per_player` pieces per side are placed.
    /// Caller contract: `settings` has been validated.
    pub fn initial(settings: &GameSettings) -> Self {
        let size = settings.board_size;
        let per_side = settings.pieces_per_player as usize;
        let mut pieces = Vec::with_capacity(per_side * 2);

        for color in [Color::Black, Color::White] {
            let mut placed = 0usize;
            'rows: for step in 0..size {
                let row = match color {
                    Color::Black => step,
                    Color::White => size - 1 - step,
                };
                let start_col = if row % 2 == 0 { 1 } else { 0 };
                for col in (start_col..size).step_by(2) {
                    if placed == per_side {
                        break 'rows;
                    }
                    pieces.push(Piece::man(pieces.len() as u16, color, row, col));
                    placed += 1;
                }
            }
        }

        debug_assert!(Self::from_pieces(size, pieces.clone()).is_ok());
        Self { size, pieces }
    }

    /// Builds a board from an arbitrary placement, rejecting overlaps.
    pub fn from_pieces(size: u8, pieces: Vec<Piece>) -> Result<Self, SetupError> {
        let mut squares = HashSet::with_capacity(pieces.len());
        let mut ids = HashSet::with_capacity(pieces.len());

        for piece in &pieces {
            let Position { row, col } = piece.position;
            if !in_bounds(row as i32, col as i32, size) {
                return Err(SetupError::OutOfBounds(piece.id, piece.position));
            }
            if !squares.insert(piece.position) {
                return Err(SetupError::Occupied(piece.position));
            }
            if !ids.insert(piece.id) {
                return Err(SetupError::DuplicateId(piece.id));
            }
        }

        Ok(Self { size, pieces })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece_at(&self, position: Position) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.position == position)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id == id)
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(move |piece| piece.color == color)
    }

    pub fn count(&self, color: Color) -> u8 {
        self.pieces_of(color).count() as u8
    }

    /// Returns the board after `id` plays `mv`: the piece lands on `mv.to`, every
    /// square in `mv.captures` is cleared and the piece is crowned if it landed on
    /// its promotion row.
    pub fn with_move(&self, id: PieceId, mv: &Move) -> Self {
        let pieces = self
            .pieces
            .iter()
            .filter(|piece| !mv.captures.contains(&piece.position))
            .map(|piece| {
                if piece.id != id {
                    return *piece;
                }
                Piece {
                    position: mv.to,
                    is_king: piece.is_king || promotes(piece.color, mv.to, self.size),
                    ..*piece
                }
            })
            .collect();

        Self {
            size: self.size,
            pieces,
        }
    }

    /// Converts the board to row-major cells.
    /// 0=empty, 1=black, 2=white, 3=black king, 4=white king.
    pub fn to_array(&self) -> Vec<u8> {
        let size = self.size as usize;
        let mut cells = vec![EMPTY_CELL; size * size];
        for piece in &self.pieces {
            let base = match piece.color {
                Color::Black => BLACK_CELL,
                Color::White => WHITE_CELL,
            };
            let idx = piece.position.row as usize * size + piece.position.col as usize;
            cells[idx] = if piece.is_king { base + KING_OFFSET } else { base };
        }
        cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial(&GameSettings::default())
    }
}

/// Returns true when both coordinates are in `[0, size)`.
pub fn in_bounds(row: i32, col: i32, size: u8) -> bool {
    (0..size as i32).contains(&row) && (0..size as i32).contains(&col)
}

/// Most pieces a side may start with while leaving two empty middle rows.
pub fn side_capacity(size: u8) -> usize {
    let per_row = size as usize / 2;
    per_row.saturating_sub(1) * per_row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(board_size: u8, pieces_per_player: u8) -> GameSettings {
        GameSettings {
            board_size,
            pieces_per_player,
            mandatory_capture: true,
        }
    }

    #[test]
    fn initial_layout_fills_three_dark_rows_per_side_on_8x8() {
        let board = Board::initial(&settings(8, 12));

        assert_eq!(board.count(Color::Black), 12);
        assert_eq!(board.count(Color::White), 12);
        assert!(board.pieces_of(Color::Black).all(|p| p.position.row <= 2));
        assert!(board.pieces_of(Color::White).all(|p| p.position.row >= 5));
        assert!(
            board
                .pieces()
                .iter()
                .all(|p| (p.position.row + p.position.col) % 2 == 1)
        );
        assert_eq!(board.piece_at(Position::new(0, 1)).unwrap().color, Color::Black);
        assert_eq!(board.piece_at(Position::new(7, 0)).unwrap().color, Color::White);
        assert!(board.piece_at(Position::new(3, 2)).is_none());
    }

    #[test]
    fn initial_layout_stops_mid_row_at_piece_count() {
        let board = Board::initial(&settings(8, 9));

        let black_rows: Vec<u8> = board.pieces_of(Color::Black).map(|p| p.position.row).collect();
        assert_eq!(black_rows, vec![0, 0, 0, 0, 1, 1, 1, 1, 2]);
        assert_eq!(board.piece_at(Position::new(2, 1)).unwrap().color, Color::Black);
        assert!(board.piece_at(Position::new(2, 3)).is_none());
        assert_eq!(board.piece_at(Position::new(5, 0)).unwrap().color, Color::White);
        assert!(board.piece_at(Position::new(5, 2)).is_none());
    }

    #[test]
    fn piece_ids_are_unique_and_positions_distinct() {
        for (size, count) in [(6, 6), (8, 12), (10, 20)] {
            let board = Board::initial(&settings(size, count));
            let rebuilt = Board::from_pieces(size, board.pieces().to_vec());
            assert_eq!(rebuilt, Ok(board));
        }
    }

    #[test]
    fn side_capacity_leaves_two_middle_rows() {
        assert_eq!(side_capacity(6), 6);
        assert_eq!(side_capacity(8), 12);
        assert_eq!(side_capacity(10), 20);
    }

    #[test]
    fn from_pieces_rejects_overlap_and_off_board() {
        let overlap = vec![
            Piece::man(0, Color::Black, 2, 1),
            Piece::man(1, Color::White, 2, 1),
        ];
        assert_eq!(
            Board::from_pieces(8, overlap),
            Err(SetupError::Occupied(Position::new(2, 1)))
        );

        let outside = vec![Piece::man(0, Color::Black, 8, 1)];
        assert_eq!(
            Board::from_pieces(8, outside),
            Err(SetupError::OutOfBounds(PieceId(0), Position::new(8, 1)))
        );
    }

    #[test]
    fn with_move_relocates_removes_captures_and_keeps_original() {
        let board = Board::from_pieces(
            8,
            vec![
                Piece::man(0, Color::Black, 2, 1),
                Piece::man(1, Color::White, 3, 2),
            ],
        )
        .unwrap();
        let mv = Move {
            from: Position::new(2, 1),
            to: Position::new(4, 3),
            captures: vec![Position::new(3, 2)],
        };

        let next = board.with_move(PieceId(0), &mv);

        assert_eq!(next.count(Color::White), 0);
        assert_eq!(next.piece(PieceId(0)).unwrap().position, Position::new(4, 3));
        assert_eq!(board.count(Color::White), 1);
        assert_eq!(board.piece(PieceId(0)).unwrap().position, Position::new(2, 1));
    }

    #[test]
    fn with_move_crowns_on_back_rank_and_king_stays_king() {
        let board = Board::from_pieces(
            8,
            vec![
                Piece::man(0, Color::Black, 6, 1),
                Piece::king(1, Color::White, 3, 2),
            ],
        )
        .unwrap();

        let crowned = board.with_move(PieceId(0), &Move::step(Position::new(6, 1), Position::new(7, 2)));
        assert!(crowned.piece(PieceId(0)).unwrap().is_king);

        let retreated = crowned.with_move(PieceId(1), &Move::step(Position::new(3, 2), Position::new(4, 3)));
        assert!(retreated.piece(PieceId(1)).unwrap().is_king);
        assert!(retreated.piece(PieceId(0)).unwrap().is_king);
    }

    #[test]
    fn to_array_marks_kings() {
        let board = Board::from_pieces(
            6,
            vec![
                Piece::man(0, Color::Black, 0, 1),
                Piece::king(1, Color::White, 5, 0),
            ],
        )
        .unwrap();

        let cells = board.to_array();

        assert_eq!(cells.len(), 36);
        assert_eq!(cells[1], 1);
        assert_eq!(cells[30], 4);
        assert_eq!(cells.iter().filter(|&&c| c != 0).count(), 2);
    }
}
