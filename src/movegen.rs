use crate::board::Board;
use crate::types::{Color, Move, Piece, Position};

/// Diagonal step as `(row delta, col delta)`.
pub type Direction = (i32, i32);

const BLACK_MAN_DIRECTIONS: [Direction; 2] = [(1, -1), (1, 1)];
const WHITE_MAN_DIRECTIONS: [Direction; 2] = [(-1, -1), (-1, 1)];
const KING_DIRECTIONS: [Direction; 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Movement directions for a piece. Captures use the same set.
pub fn directions(color: Color, is_king: bool) -> &'static [Direction] {
    match (color, is_king) {
        (_, true) => &KING_DIRECTIONS,
        (Color::Black, false) => &BLACK_MAN_DIRECTIONS,
        (Color::White, false) => &WHITE_MAN_DIRECTIONS,
    }
}

/// Returns true when a piece of `color` standing on `at` is crowned.
pub fn promotes(color: Color, at: Position, size: u8) -> bool {
    match color {
        Color::Black => at.row + 1 == size,
        Color::White => at.row == 0,
    }
}

/// Non-capturing single steps onto empty squares.
pub fn normal_moves(board: &Board, piece: &Piece) -> Vec<Move> {
    directions(piece.color, piece.is_king)
        .iter()
        .filter_map(|&dir| piece.position.offset(dir, 1, board.size()))
        .filter(|&to| board.piece_at(to).is_none())
        .map(|to| Move::step(piece.position, to))
        .collect()
}

/// Every capture chain reachable from the piece's square, in depth-first order.
///
/// Each chain prefix is reported as its own move, followed by its extensions, so
/// a chain of two jumps yields the one-jump move and the two-jump move.
pub fn captures(board: &Board, piece: &Piece) -> Vec<Move> {
    let mut out = Vec::new();
    let mut chain = Vec::new();
    collect_captures(board, piece, piece.position, &mut chain, &mut out);
    out
}

/// Cheaper form of `!captures(board, piece).is_empty()`: only the first jump is tried.
pub fn can_capture(board: &Board, piece: &Piece) -> bool {
    directions(piece.color, piece.is_king)
        .iter()
        .any(|&dir| jump(board, piece, piece.position, dir, &[]).is_some())
}

/// Legal moves for `piece` under the capture policy.
///
/// With `mandatory_capture`, a capture anywhere for the piece's side restricts the
/// piece to its own captures, which may leave it with no moves at all. Otherwise a
/// piece that can capture is offered its captures and any other piece its steps.
pub fn legal_moves_for(board: &Board, piece: &Piece, mandatory_capture: bool) -> Vec<Move> {
    let own = captures(board, piece);
    if !own.is_empty() {
        return own;
    }
    if mandatory_capture && has_any_capture(board, piece.color) {
        return Vec::new();
    }
    normal_moves(board, piece)
}

pub fn has_any_capture(board: &Board, color: Color) -> bool {
    board.pieces_of(color).any(|piece| can_capture(board, piece))
}

/// Returns true when at least one piece of `color` has a legal move.
pub fn has_any_move(board: &Board, color: Color) -> bool {
    board
        .pieces_of(color)
        .any(|piece| can_capture(board, piece) || !normal_moves(board, piece).is_empty())
}

fn collect_captures(
    board: &Board,
    piece: &Piece,
    from: Position,
    chain: &mut Vec<Position>,
    out: &mut Vec<Move>,
) {
    for &dir in directions(piece.color, piece.is_king) {
        let Some((over, landing)) = jump(board, piece, from, dir, chain.as_slice()) else {
            continue;
        };

        chain.push(over);
        out.push(Move {
            from: piece.position,
            to: landing,
            captures: chain.clone(),
        });
        collect_captures(board, piece, landing, chain, out);
        chain.pop();
    }
}

/// Tests a single jump from `from` along `dir` with `piece` virtually standing on
/// `from`. Squares in `captured` count as already emptied.
fn jump(
    board: &Board,
    piece: &Piece,
    from: Position,
    dir: Direction,
    captured: &[Position],
) -> Option<(Position, Position)> {
    let size = board.size();
    let over = from.offset(dir, 1, size)?;
    let landing = from.offset(dir, 2, size)?;

    if captured.contains(&over) {
        return None;
    }
    let jumped = board.piece_at(over)?;
    if jumped.color == piece.color {
        return None;
    }

    let blocked = board
        .piece_at(landing)
        .is_some_and(|other| other.id != piece.id && !captured.contains(&landing));
    if blocked {
        return None;
    }

    Some((over, landing))
}
