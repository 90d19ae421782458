//! Autoplay engine for sliding-tile browser games
//!
//! Presses directional keys on a live game page, watches the rendered board
//! for changes, rotates its move order when stuck and stops on game over.
//! The browser and the display are reached only through [`PageDriver`] and
//! [`FrameSink`].

mod autoplay;
mod config;
mod direction;
mod driver;
mod error;
mod escape;
mod log_buffer;
mod observer;
mod pacing;
mod strategy;

#[cfg(test)]
mod testing;

pub use autoplay::{Autoplay, FinishReason, RunPhase, RunReport, StepEffect, STUCK_THRESHOLD};
pub use config::{RunConfig, DEFAULT_URL};
pub use direction::{Direction, Preset};
pub use driver::{Extractor, FrameSink, NoopSink, PageDriver};
pub use error::{AutoplayError, DriverError, DriverResult, ErrorCategory};
pub use escape::{Escape, EscapePolicy};
pub use log_buffer::{LogBuffer, DEFAULT_LOG_CAPACITY};
pub use observer::{parse_score, BoardObserver, BoardSignature, GameSelectors, Observation};
pub use pacing::{frame_interval, Clock, SystemClock, Throttle, MAX_FPS, MIN_FPS, MIN_FRAME_DELAY};
pub use strategy::{format_order, MoveStrategy};
