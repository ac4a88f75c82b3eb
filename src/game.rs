use log::debug;
use thiserror::Error;

use crate::board::Board;
use crate::movegen;
use crate::settings::{GameSettings, KeyValueStore, MemoryStore, Preferences, SettingsError};
use crate::types::{Color, GameResult, GameState, GameStatus, Move, Piece, PieceId, Position};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game is already over")]
    GameOver,
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),
    #[error("no piece on {0}")]
    EmptySquare(Position),
    #[error("piece {0} does not belong to the player to move")]
    NotYourPiece(PieceId),
    #[error("capture chain must continue with piece {0}")]
    ChainLocked(PieceId),
    #[error("piece {0} has no legal moves")]
    NoLegalMoves(PieceId),
    #[error("no piece selected")]
    NoSelection,
    #[error("illegal move to {0}")]
    IllegalMove(Position),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("board size {board} does not match settings ({settings})")]
    SizeMismatch { board: u8, settings: u8 },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Session state at a committed move boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GameSnapshot {
    board: Board,
    current_player: Color,
    /// Piece that must keep capturing, if a chain is in progress.
    locked: Option<PieceId>,
    status: GameStatus,
    winner: Option<Color>,
}

/// Turn-based controller for one local two-player game.
///
/// Every mutating call either succeeds or returns an error and leaves the session
/// untouched.
pub struct GameSession {
    board: Board,
    settings: GameSettings,
    current_player: Color,
    selected: Option<PieceId>,
    legal_moves: Vec<Move>,
    locked: Option<PieceId>,
    status: GameStatus,
    winner: Option<Color>,
    history: Vec<GameSnapshot>,
    cursor: usize,
    preferences: Preferences,
    tutorial_seen: bool,
}

impl GameSession {
    /// Starts a game with the settings found in `store`, or the defaults.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let preferences = Preferences::new(store);
        let settings = preferences.load_settings();
        let tutorial_seen = preferences.tutorial_seen();
        let board = Board::initial(&settings);
        Self::start(settings, board, Color::Black, preferences, tutorial_seen)
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::default()))
    }

    /// Starts from an arbitrary placement with `to_move` to play.
    pub fn from_position(
        settings: GameSettings,
        board: Board,
        to_move: Color,
    ) -> Result<Self, GameError> {
        settings.validate()?;
        if board.size() != settings.board_size {
            return Err(GameError::SizeMismatch {
                board: board.size(),
                settings: settings.board_size,
            });
        }
        Ok(Self::start(settings, board, to_move, Preferences::in_memory(), false))
    }

    fn start(
        settings: GameSettings,
        board: Board,
        current_player: Color,
        preferences: Preferences,
        tutorial_seen: bool,
    ) -> Self {
        let mut session = Self {
            board,
            settings,
            current_player,
            selected: None,
            legal_moves: Vec::new(),
            locked: None,
            status: GameStatus::Playing,
            winner: None,
            history: Vec::new(),
            cursor: 0,
            preferences,
            tutorial_seen,
        };
        session.history.push(session.snapshot());
        session
    }

    /// Discards the current game and lays out a fresh board.
    pub fn new_game(&mut self, settings: GameSettings) -> Result<(), GameError> {
        settings.validate()?;

        self.board = Board::initial(&settings);
        self.settings = settings;
        self.current_player = Color::Black;
        self.locked = None;
        self.status = GameStatus::Playing;
        self.winner = None;
        self.clear_selection();
        self.history = vec![self.snapshot()];
        self.cursor = 0;

        debug!(
            "new game: {0}x{0}, {1} per side, mandatory capture {2}",
            settings.board_size, settings.pieces_per_player, settings.mandatory_capture
        );
        Ok(())
    }

    /// Persists `settings` and starts a new game with them.
    pub fn update_settings(&mut self, settings: GameSettings) -> Result<(), GameError> {
        self.preferences.save_settings(&settings)?;
        self.new_game(settings)
    }

    pub fn mark_tutorial_seen(&mut self) -> Result<(), GameError> {
        self.preferences.set_tutorial_seen(true)?;
        self.tutorial_seen = true;
        Ok(())
    }

    pub fn select_piece(&mut self, id: PieceId) -> Result<(), GameError> {
        self.ensure_playing()?;

        let piece = *self.board.piece(id).ok_or(GameError::UnknownPiece(id))?;
        if piece.color != self.current_player {
            return Err(GameError::NotYourPiece(id));
        }
        if let Some(locked) = self.locked
            && locked != id
        {
            return Err(GameError::ChainLocked(locked));
        }

        let moves = if self.locked.is_some() {
            movegen::captures(&self.board, &piece)
        } else {
            movegen::legal_moves_for(&self.board, &piece, self.settings.mandatory_capture)
        };
        if moves.is_empty() {
            return Err(GameError::NoLegalMoves(id));
        }

        debug!("{} selected piece {id} with {} moves", piece.color, moves.len());
        self.selected = Some(id);
        self.legal_moves = moves;
        Ok(())
    }

    pub fn select_at(&mut self, position: Position) -> Result<(), GameError> {
        let id = self
            .board
            .piece_at(position)
            .map(|piece| piece.id)
            .ok_or(GameError::EmptySquare(position))?;
        self.select_piece(id)
    }

    /// Plays the first legal move of the selected piece that lands on `to`.
    pub fn attempt_move(&mut self, to: Position) -> Result<(), GameError> {
        self.ensure_playing()?;
        let id = self.selected.ok_or(GameError::NoSelection)?;
        let mv = self
            .legal_moves
            .iter()
            .find(|mv| mv.to == to)
            .cloned()
            .ok_or(GameError::IllegalMove(to))?;
        self.commit(id, mv)
    }

    /// Plays the legal move that lands on `to` after capturing exactly `captures`,
    /// in order. Distinguishes chains that share a landing square.
    pub fn attempt_chain(&mut self, to: Position, captures: &[Position]) -> Result<(), GameError> {
        self.ensure_playing()?;
        let id = self.selected.ok_or(GameError::NoSelection)?;
        let mv = self
            .legal_moves
            .iter()
            .find(|mv| mv.to == to && mv.captures == captures)
            .cloned()
            .ok_or(GameError::IllegalMove(to))?;
        self.commit(id, mv)
    }

    pub fn undo(&mut self) -> Result<(), GameError> {
        if self.cursor == 0 {
            return Err(GameError::NothingToUndo);
        }
        self.cursor -= 1;
        self.restore(self.history[self.cursor].clone());
        debug!("undo to ply {}", self.cursor);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), GameError> {
        if self.cursor + 1 >= self.history.len() {
            return Err(GameError::NothingToRedo);
        }
        self.cursor += 1;
        self.restore(self.history[self.cursor].clone());
        debug!("redo to ply {}", self.cursor);
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        self.board.pieces()
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    pub fn is_capturing(&self) -> bool {
        self.locked.is_some()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn tutorial_seen(&self) -> bool {
        self.tutorial_seen
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn to_game_state(&self) -> GameState {
        GameState {
            board_size: self.board.size(),
            board: self.board.to_array(),
            pieces: self.board.pieces().to_vec(),
            current_player: self.current_player,
            selected: self.selected,
            legal_moves: self.legal_moves.clone(),
            is_capturing: self.is_capturing(),
            status: self.status,
            winner: self.winner,
            black_count: self.board.count(Color::Black),
            white_count: self.board.count(Color::White),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Returns `None` while the game is still being played.
    pub fn to_game_result(&self) -> Option<GameResult> {
        if self.status != GameStatus::Finished {
            return None;
        }
        Some(GameResult {
            winner: self.winner,
            black_count: self.board.count(Color::Black),
            white_count: self.board.count(Color::White),
        })
    }

    fn commit(&mut self, id: PieceId, mv: Move) -> Result<(), GameError> {
        let board = self.board.with_move(id, &mv);
        let piece = *board.piece(id).ok_or(GameError::UnknownPiece(id))?;
        self.board = board;

        if mv.is_capture() {
            let further = movegen::captures(&self.board, &piece);
            if !further.is_empty() {
                debug!(
                    "piece {id} captured {} and must continue from {}",
                    mv.captures.len(),
                    mv.to
                );
                self.locked = Some(id);
                self.selected = Some(id);
                self.legal_moves = further;
                self.record();
                return Ok(());
            }
        }

        debug!("{} played {id} {} -> {}", self.current_player, mv.from, mv.to);
        self.locked = None;
        self.clear_selection();
        self.current_player = self.current_player.opponent();
        self.update_status();
        self.record();
        Ok(())
    }

    fn update_status(&mut self) {
        let mover = self.current_player.opponent();
        let black = self.board.count(Color::Black);
        let white = self.board.count(Color::White);

        let winner = if black == 0 {
            Some(Color::White)
        } else if white == 0 {
            Some(Color::Black)
        } else if !movegen::has_any_move(&self.board, self.current_player) {
            Some(mover)
        } else {
            None
        };

        if let Some(winner) = winner {
            debug!("game over, {winner} wins");
            self.status = GameStatus::Finished;
            self.winner = Some(winner);
        }
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        match self.status {
            GameStatus::Playing => Ok(()),
            GameStatus::Finished => Err(GameError::GameOver),
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.legal_moves.clear();
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            current_player: self.current_player,
            locked: self.locked,
            status: self.status,
            winner: self.winner,
        }
    }

    fn record(&mut self) {
        self.history.truncate(self.cursor + 1);
        self.history.push(self.snapshot());
        self.cursor = self.history.len() - 1;
    }

    fn restore(&mut self, snapshot: GameSnapshot) {
        self.board = snapshot.board;
        self.current_player = snapshot.current_player;
        self.locked = snapshot.locked;
        self.status = snapshot.status;
        self.winner = snapshot.winner;
        self.clear_selection();
    }
}
