//! Note Fall core crate.
//!
//! Falling-note rhythm game for the browser. Notes of a chart drop down four
//! lanes; pressing the lane key while a note sits in the hit zone scores,
//! pressing with nothing there costs a point. The gameplay itself is a pure
//! reducer over [`game::GameState`] (native-testable); [`session`] folds the
//! merged clock / activation / keyboard queue through it and `web` wires the
//! page (canvas, Web Audio, keyboard, frame loop).

use wasm_bindgen::prelude::*;

pub mod chart;
pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod rng;
pub mod schedule;
pub mod session;
pub mod web;

pub use chart::{Lane, NoteDescriptor, NoteId, parse_chart};
pub use config::{GameConfig, Rules};
pub use error::{ActionError, ChartError, ConfigError};
pub use game::{Action, ActiveNote, GameState, Outcome, Reduction, Snapshot, reduce, replay};
pub use rng::Lcg;
pub use schedule::{EventKind, Schedule, ScheduledEvent};
pub use session::{AudioSink, RenderSink, Session};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// Page entrypoints
// -----------------------------------------------------------------------------

/// Parse `chart_csv` and start a game with the stock settings.
#[wasm_bindgen]
pub fn start_game(chart_csv: &str) -> Result<(), JsValue> {
    let chart = parse_chart(chart_csv).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::start(chart, GameConfig::default())
}

/// Like `start_game`, with a JSON `GameConfig` (missing fields take defaults).
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(chart_csv: &str, config_json: &str) -> Result<(), JsValue> {
    let config =
        GameConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let chart = parse_chart(chart_csv).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::start(chart, config)
}

/// Queue a textual action (`tick`, `activate:<id>`, `press:<1-4>`, `end`) into
/// the running game. Unknown actions are rejected.
#[wasm_bindgen]
pub fn push_action(action: &str) -> Result<(), JsValue> {
    web::push_action(action)
}

/// Score, tick count, end flag and active note positions as JSON.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn snapshot_json() -> Result<String, JsValue> {
    web::snapshot_json()
}
