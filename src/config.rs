//! Tunable game constants and host settings.
//!
//! `Rules` are the numbers the reducer scores with; they ride along inside
//! every `GameState`. `GameConfig` adds the host-side settings (clock rate,
//! seed, key bindings, canvas size). Defaults reproduce the stock game.

use crate::chart::Lane;
use crate::error::ConfigError;
use crate::rng::DEFAULT_SEED;

/// Shortest clock period accepted from a config.
pub const MIN_TICK_MS: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Rules {
    /// Vertical units a note falls per tick.
    pub step: f64,
    /// Notes below this position have left the playable region.
    pub exit_threshold: f64,
    pub hit_low: f64,
    pub hit_high: f64,
    pub hit_reward: u32,
    pub miss_penalty: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            step: 5.0,
            exit_threshold: 350.0,
            hit_low: 320.0,
            hit_high: 350.0,
            hit_reward: 10,
            miss_penalty: 1,
        }
    }
}

impl Rules {
    pub fn in_hit_window(&self, position: f64) -> bool {
        (self.hit_low..=self.hit_high).contains(&position)
    }

    /// Ticks a freshly activated note needs before it leaves the lane.
    pub fn ticks_to_exit(&self) -> u64 {
        if self.step <= 0.0 {
            return 0;
        }
        (self.exit_threshold / self.step).floor() as u64 + 1
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub rules: Rules,
    /// Fixed clock period driving `Tick` actions.
    pub tick_ms: f64,
    pub seed: u32,
    /// `KeyboardEvent.code` per lane, lane one first.
    pub key_bindings: [String; 4],
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            tick_ms: 16.0,
            seed: DEFAULT_SEED,
            key_bindings: [
                "KeyH".to_string(),
                "KeyJ".to_string(),
                "KeyK".to_string(),
                "KeyL".to_string(),
            ],
            canvas_width: 200,
            canvas_height: 400,
        }
    }
}

impl GameConfig {
    /// Lane bound to a keyboard code; unbound keys give `None`.
    pub fn lane_for_key(&self, code: &str) -> Option<Lane> {
        self.key_bindings
            .iter()
            .position(|k| k == code)
            .map(|idx| Lane::ALL[idx])
    }

    /// Milliseconds one note spends falling from the top to past the exit line.
    pub fn travel_ms(&self) -> f64 {
        self.rules.ticks_to_exit() as f64 * self.tick_ms
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the reducer and the clock cannot run with: the fall
    /// step and tick length must be positive and finite, and the hit window
    /// must sit inside `[0, exit_threshold]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };
        let r = &self.rules;
        if !self.tick_ms.is_finite() || self.tick_ms < MIN_TICK_MS {
            return invalid(format!(
                "tick_ms must be at least {MIN_TICK_MS}, got {}",
                self.tick_ms
            ));
        }
        if !r.step.is_finite() || r.step <= 0.0 {
            return invalid(format!("step must be positive, got {}", r.step));
        }
        if !r.exit_threshold.is_finite() || r.exit_threshold <= 0.0 {
            return invalid(format!(
                "exit_threshold must be positive, got {}",
                r.exit_threshold
            ));
        }
        if !(r.hit_low.is_finite() && r.hit_high.is_finite()) || r.hit_low < 0.0 {
            return invalid(format!(
                "hit window {}..={} must be finite and start at 0 or above",
                r.hit_low, r.hit_high
            ));
        }
        if r.hit_low > r.hit_high {
            return invalid("hit_low is above hit_high".into());
        }
        if r.hit_high > r.exit_threshold {
            return invalid(format!(
                "hit_high {} is past the exit line {}",
                r.hit_high, r.exit_threshold
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_match_stock_game() {
        let r = Rules::default();
        assert_eq!(r.step, 5.0);
        assert_eq!(r.exit_threshold, 350.0);
        assert!(r.in_hit_window(320.0));
        assert!(r.in_hit_window(350.0));
        assert!(!r.in_hit_window(315.0));
        assert!(!r.in_hit_window(355.0));
        // 71 steps of 5 take a note from 0 to 355, past the exit line.
        assert_eq!(r.ticks_to_exit(), 71);
    }

    #[test]
    fn key_bindings_map_to_lanes() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.lane_for_key("KeyH"), Some(Lane::One));
        assert_eq!(cfg.lane_for_key("KeyL"), Some(Lane::Four));
        assert_eq!(cfg.lane_for_key("KeyA"), None);
        assert_eq!(cfg.travel_ms(), 71.0 * 16.0);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_config_fills_defaults() {
        let cfg = GameConfig::from_json(r#"{"seed": 7, "rules": {"hit_reward": 25}}"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.rules.hit_reward, 25);
        assert_eq!(cfg.rules.step, 5.0);
        assert_eq!(cfg.tick_ms, 16.0);
        assert!(GameConfig::from_json(r#"{"tick_ms": 0}"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
    }

    #[test]
    fn validate_guards_fall_and_clock() {
        assert!(GameConfig::default().validate().is_ok());

        let with_rules = |edit: fn(&mut Rules)| {
            let mut cfg = GameConfig::default();
            edit(&mut cfg.rules);
            cfg.validate()
        };
        assert!(with_rules(|r| r.step = -5.0).is_err());
        assert!(with_rules(|r| r.step = 0.0).is_err());
        assert!(with_rules(|r| r.step = f64::NAN).is_err());
        assert!(with_rules(|r| r.hit_low = -1.0).is_err());
        assert!(with_rules(|r| r.hit_high = 400.0).is_err());
        assert!(with_rules(|r| r.exit_threshold = f64::INFINITY).is_err());
        assert!(with_rules(|r| r.hit_low = 340.0).is_ok());

        for tick_ms in [1e-300, 0.5, f64::INFINITY, f64::NAN] {
            let cfg = GameConfig {
                tick_ms,
                ..GameConfig::default()
            };
            assert!(cfg.validate().is_err(), "tick_ms {tick_ms} accepted");
        }
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_config_rejects_bad_rules() {
        for bad in [
            r#"{"rules": {"step": -5.0}}"#,
            r#"{"rules": {"step": 0}}"#,
            r#"{"rules": {"hit_low": -10}}"#,
            r#"{"rules": {"hit_high": 360}}"#,
            r#"{"tick_ms": 1e-300}"#,
        ] {
            match GameConfig::from_json(bad) {
                Err(ConfigError::Invalid(_)) => {}
                other => panic!("{bad} gave {other:?}"),
            }
        }
    }
}
