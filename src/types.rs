use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::in_bounds;

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Steps `distance` squares along `(dr, dc)`.
    /// Returns `None` when the result leaves a `size`×`size` board.
    pub fn offset(self, (dr, dc): (i32, i32), distance: i32, size: u8) -> Option<Self> {
        let row = self.row as i32 + dr * distance;
        let col = self.col as i32 + dc * distance;
        if in_bounds(row, col, size) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Side to move. Black starts on the low rows and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => f.write_str("black"),
            Self::White => f.write_str("white"),
        }
    }
}

/// Stable identity of a piece for the lifetime of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u16);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub color: Color,
    /// Never reverts to `false` once set.
    pub is_king: bool,
    pub position: Position,
}

impl Piece {
    pub fn man(id: u16, color: Color, row: u8, col: u8) -> Self {
        Self {
            id: PieceId(id),
            color,
            is_king: false,
            position: Position::new(row, col),
        }
    }

    pub fn king(id: u16, color: Color, row: u8, col: u8) -> Self {
        Self {
            is_king: true,
            ..Self::man(id, color, row, col)
        }
    }
}

/// A candidate or committed move.
///
/// A capturing move spans the whole chain: `to` is the final landing square and
/// `captures` lists every jumped square in the order it was jumped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub captures: Vec<Position>,
}

impl Move {
    pub fn step(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            captures: Vec::new(),
        }
    }

    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Finished,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub board_size: u8,
    /// Row-major cells: 0=empty, 1=black, 2=white, 3=black king, 4=white king.
    pub board: Vec<u8>,
    pub pieces: Vec<Piece>,
    pub current_player: Color,
    pub selected: Option<PieceId>,
    pub legal_moves: Vec<Move>,
    /// Contract:
    /// - `true` while the selected piece must keep capturing.
    /// - Selection of any other piece is rejected until it turns `false`.
    pub is_capturing: bool,
    pub status: GameStatus,
    pub winner: Option<Color>,
    pub black_count: u8,
    pub white_count: u8,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: Option<Color>,
    pub black_count: u8,
    pub white_count: u8,
}
