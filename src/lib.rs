use wasm_bindgen::prelude::*;

pub mod board;
pub mod game;
pub mod movegen;
pub mod settings;
pub mod types;
pub mod wasm;
#[cfg(target_arch = "wasm32")]
pub mod web_storage;

pub use game::{GameError, GameSession};
pub use settings::GameSettings;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
