//! Test doubles for the page, clock and display.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::driver::{Extractor, FrameSink, PageDriver};
use crate::error::{DriverError, DriverResult, ErrorCategory};
use crate::observer::GameSelectors;
use crate::pacing::Clock;

/// Clock that only moves when told to
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// How the board reacts to one key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    Change,
    NoChange,
}

/// Page whose board reacts to key presses according to a script.
///
/// Once the script runs out every further press uses the fallback response
/// (no change unless configured otherwise).
pub struct ScriptedPage {
    selectors: GameSelectors,
    script: VecDeque<KeyResponse>,
    fallback: KeyResponse,
    revision: u64,
    keys: Vec<String>,
    attempts: usize,
    fail_key_at: Option<usize>,
    game_over_after: Option<usize>,
    queries_failing: bool,
    screenshot_failing: bool,
    clock: Option<ManualClock>,
    closes: usize,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self {
            selectors: GameSelectors::default(),
            script: VecDeque::new(),
            fallback: KeyResponse::NoChange,
            revision: 0,
            keys: Vec::new(),
            attempts: 0,
            fail_key_at: None,
            game_over_after: None,
            queries_failing: false,
            screenshot_failing: false,
            clock: None,
            closes: 0,
        }
    }

    pub fn script(mut self, responses: impl IntoIterator<Item = KeyResponse>) -> Self {
        self.script.extend(responses);
        self
    }

    pub fn fallback(mut self, response: KeyResponse) -> Self {
        self.fallback = response;
        self
    }

    /// Make the `n`th key press (1-based) fail
    pub fn fail_key_at(mut self, n: usize) -> Self {
        self.fail_key_at = Some(n);
        self
    }

    /// Show the game-over indicator once `n` keys went through
    pub fn game_over_after_keys(mut self, n: usize) -> Self {
        self.game_over_after = Some(n);
        self
    }

    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn set_queries_failing(&mut self, failing: bool) {
        self.queries_failing = failing;
    }

    pub fn set_screenshot_failing(&mut self, failing: bool) {
        self.screenshot_failing = failing;
    }

    /// Keys that were delivered, in order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn closes(&self) -> usize {
        self.closes
    }

    fn score(&self) -> u64 {
        self.revision * 1024
    }

    fn query_failed(&self, selector: &str) -> DriverError {
        DriverError::Query {
            selector: selector.to_string(),
            reason: "execution context was destroyed".to_string(),
        }
    }
}

impl Default for ScriptedPage {
    fn default() -> Self {
        Self::new()
    }
}

fn with_separators(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl PageDriver for ScriptedPage {
    fn send_key(&mut self, key: &str) -> DriverResult<()> {
        self.attempts += 1;
        if self.fail_key_at == Some(self.attempts) {
            return Err(DriverError::Input {
                key: key.to_string(),
                reason: "target closed".to_string(),
            });
        }
        self.keys.push(key.to_string());
        let response = self.script.pop_front().unwrap_or(self.fallback);
        if response == KeyResponse::Change {
            self.revision += 1;
        }
        Ok(())
    }

    fn screenshot(&mut self) -> DriverResult<Vec<u8>> {
        if self.screenshot_failing {
            return Err(DriverError::Screenshot("capture timed out".to_string()));
        }
        Ok(format!("frame r{}", self.revision).into_bytes())
    }

    fn query_text(&mut self, selector: &str) -> DriverResult<String> {
        if self.queries_failing || selector != self.selectors.score {
            return Err(self.query_failed(selector));
        }
        Ok(format!("{}\n+4", with_separators(self.score())))
    }

    fn query_count(&mut self, selector: &str) -> DriverResult<usize> {
        if self.queries_failing || selector != self.selectors.game_over {
            return Err(self.query_failed(selector));
        }
        let over = self
            .game_over_after
            .map_or(false, |n| self.keys.len() >= n);
        Ok(usize::from(over))
    }

    fn query_all(&mut self, selector: &str, extractor: Extractor) -> DriverResult<Vec<String>> {
        if self.queries_failing || selector != self.selectors.tiles {
            return Err(self.query_failed(selector));
        }
        assert_eq!(extractor, Extractor::ClassName);
        // Deliberately unsorted
        Ok(vec![
            format!("tile tile-4 tile-position-2-2 rev-{}", self.revision),
            "tile tile-2 tile-position-1-1".to_string(),
        ])
    }

    fn wait(&mut self, duration: Duration) {
        if let Some(clock) = &self.clock {
            clock.advance(duration);
        }
    }

    fn close(&mut self) -> DriverResult<()> {
        self.closes += 1;
        Ok(())
    }
}

/// Sink that keeps everything it receives, stamped with the clock
#[derive(Default)]
pub struct RecordingSink {
    clock: ManualClock,
    pub frames: Vec<(Duration, String)>,
    pub logs: Vec<Vec<String>>,
    pub errors: Vec<(ErrorCategory, String)>,
}

impl RecordingSink {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn captions(&self) -> Vec<&str> {
        self.frames.iter().map(|(_, c)| c.as_str()).collect()
    }

    pub fn last_log(&self) -> &[String] {
        self.logs.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl FrameSink for RecordingSink {
    fn publish_frame(&mut self, _image: &[u8], caption: &str) {
        self.frames.push((self.clock.now(), caption.to_string()));
    }

    fn publish_log(&mut self, lines: &[String]) {
        self.logs.push(lines.to_vec());
    }

    fn report_error(&mut self, category: ErrorCategory, detail: &str) {
        self.errors.push((category, detail.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_separators() {
        assert_eq!(with_separators(0), "0");
        assert_eq!(with_separators(999), "999");
        assert_eq!(with_separators(1024), "1,024");
        assert_eq!(with_separators(1234567), "1,234,567");
    }
}
