use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::direction::Preset;
use crate::error::AutoplayError;
use crate::log_buffer::DEFAULT_LOG_CAPACITY;
use crate::observer::GameSelectors;
use crate::pacing::{self, MAX_FPS, MIN_FPS};

/// Game opened when no URL is given
pub const DEFAULT_URL: &str = "https://play2048.co";

/// Options for one autoplay run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Page hosting the game
    pub url: String,
    /// Step budget
    pub max_moves: usize,
    /// Requested display refresh rate
    pub fps: u32,
    /// Initial move order
    pub preset: Preset,
    /// Probe alternate directions before counting a move as ineffective
    pub escape: bool,
    /// Pause after each primary key press
    pub settle_ms: u64,
    /// Pause after each escape probe
    pub escape_settle_ms: u64,
    /// Lines kept in the published log
    pub log_capacity: usize,
    pub selectors: GameSelectors,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_moves: 150,
            fps: 3,
            preset: Preset::UpLeft,
            escape: true,
            settle_ms: 70,
            escape_settle_ms: 35,
            log_capacity: DEFAULT_LOG_CAPACITY,
            selectors: GameSelectors::default(),
        }
    }
}

impl RunConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn escape_settle_delay(&self) -> Duration {
        Duration::from_millis(self.escape_settle_ms)
    }

    /// Effective frame rate after clamping
    pub fn effective_fps(&self) -> u32 {
        self.fps.clamp(MIN_FPS, MAX_FPS)
    }

    pub fn frame_interval(&self) -> Duration {
        pacing::frame_interval(self.fps)
    }

    /// Reject configurations the loop cannot run with
    pub fn validate(&self) -> Result<(), AutoplayError> {
        if self.max_moves == 0 {
            return Err(AutoplayError::Config(
                "max_moves must be at least 1".to_string(),
            ));
        }
        if self.url.trim().is_empty() {
            return Err(AutoplayError::Config("url must not be empty".to_string()));
        }
        let selectors = &self.selectors;
        for (name, value) in [
            ("tiles", &selectors.tiles),
            ("score", &selectors.score),
            ("game_over", &selectors.game_over),
        ] {
            if value.trim().is_empty() {
                return Err(AutoplayError::Config(format!(
                    "selector {} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}
