//! Browser console output for the `log` facade.
//!
//! Installed once from the wasm start hook. Native builds (tests) never call
//! `init`, so log macros there are no-ops.

use log::LevelFilter;

/// Install the console logger. Later calls keep the first logger and only
/// adjust the level.
pub fn init(level: LevelFilter) {
    let Some(max) = level.to_level() else {
        log::set_max_level(LevelFilter::Off);
        return;
    };
    if console_log::init_with_level(max).is_err() {
        log::debug!("console logger already installed");
    }
    log::set_max_level(level);
}
