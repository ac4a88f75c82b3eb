//! Browser-facing API. Rejected inputs come back as `false` and leave the game
//! unchanged; the reason is only logged.

use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::game::{GameError, GameSession};
use crate::settings::{GameSettings, KeyValueStore, MemoryStore};
use crate::types::{PieceId, Position};

static LOGGER: OnceCell<()> = OnceCell::new();

/// Installs the console logger and panic hook. Safe to call more than once.
pub fn init_logging() {
    LOGGER.get_or_init(|| {
        _ = console_log::init_with_level(log::Level::Debug);
        console_error_panic_hook::set_once();
    });
}

#[wasm_bindgen(start)]
pub fn start() {
    init_logging();
}

#[wasm_bindgen]
pub struct DamHaji {
    session: GameSession,
}

#[wasm_bindgen]
impl DamHaji {
    #[wasm_bindgen(constructor)]
    pub fn new() -> DamHaji {
        DamHaji {
            session: GameSession::new(default_store()),
        }
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.to_game_state())
    }

    /// `undefined` until the game is finished.
    pub fn result(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.to_game_result())
    }

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.settings())
    }

    pub fn select_piece(&mut self, id: u16) -> bool {
        accepted(self.session.select_piece(PieceId(id)))
    }

    pub fn select_at(&mut self, row: u8, col: u8) -> bool {
        accepted(self.session.select_at(Position::new(row, col)))
    }

    pub fn attempt_move(&mut self, row: u8, col: u8) -> bool {
        accepted(self.session.attempt_move(Position::new(row, col)))
    }

    /// `captures` is an array of `{ row, col }` objects.
    pub fn attempt_chain(&mut self, row: u8, col: u8, captures: JsValue) -> bool {
        let captures: Vec<Position> = match serde_wasm_bindgen::from_value(captures) {
            Ok(captures) => captures,
            Err(err) => {
                warn!("attempt_chain: bad capture list: {err}");
                return false;
            }
        };
        accepted(self.session.attempt_chain(Position::new(row, col), &captures))
    }

    /// `settings` is a `{ boardSize, piecesPerPlayer, mandatoryCapture }` object.
    pub fn new_game(&mut self, settings: JsValue) -> bool {
        match parse_settings(settings) {
            Some(settings) => accepted(self.session.new_game(settings)),
            None => false,
        }
    }

    pub fn update_settings(&mut self, settings: JsValue) -> bool {
        match parse_settings(settings) {
            Some(settings) => accepted(self.session.update_settings(settings)),
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        accepted(self.session.undo())
    }

    pub fn redo(&mut self) -> bool {
        accepted(self.session.redo())
    }

    pub fn tutorial_seen(&self) -> bool {
        self.session.tutorial_seen()
    }

    pub fn mark_tutorial_seen(&mut self) -> bool {
        accepted(self.session.mark_tutorial_seen())
    }
}

impl Default for DamHaji {
    fn default() -> Self {
        Self::new()
    }
}

fn default_store() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(storage) = crate::web_storage::LocalStorage::open() {
            return Box::new(storage);
        }
    }
    debug!("localStorage unavailable, settings will not persist");
    Box::new(MemoryStore::default())
}

fn parse_settings(value: JsValue) -> Option<GameSettings> {
    match serde_wasm_bindgen::from_value(value) {
        Ok(settings) => Some(settings),
        Err(err) => {
            warn!("bad settings object: {err}");
            None
        }
    }
}

fn accepted(result: Result<(), GameError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!("rejected: {err}");
            false
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}
