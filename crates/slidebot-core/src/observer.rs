//! Board observation.
//!
//! Reads the rendered board through a [`PageDriver`]. Query failures are kept
//! visible as [`Observation::Unavailable`] inside this module and collapse to
//! neutral defaults only through the `current_*` accessors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{Extractor, PageDriver};

/// Order-independent summary of the rendered tiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoardSignature(String);

impl BoardSignature {
    /// Build a signature from per-tile state strings, in any order
    pub fn from_tiles<I, S>(tiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tiles: Vec<String> = tiles.into_iter().map(Into::into).collect();
        tiles.sort();
        Self(tiles.join("|"))
    }

    /// True when no tiles were rendered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A read that either produced a value or could not be made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation<T> {
    Observed(T),
    Unavailable,
}

impl<T: Default> Observation<T> {
    pub fn or_default(self) -> T {
        match self {
            Observation::Observed(value) => value,
            Observation::Unavailable => T::default(),
        }
    }
}

impl<T> Observation<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Observation::Observed(_))
    }
}

/// CSS selectors for the parts of the page the observer reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSelectors {
    pub tiles: String,
    pub score: String,
    pub game_over: String,
}

impl Default for GameSelectors {
    fn default() -> Self {
        Self {
            tiles: ".tile".to_string(),
            score: ".score-container".to_string(),
            game_over: ".game-message.game-over, .game-over".to_string(),
        }
    }
}

/// Parse a score display such as `"1,024\n+8"`: first token, separators dropped
pub fn parse_score(text: &str) -> Option<u64> {
    let token = text.split_whitespace().next()?;
    token.replace(',', "").parse().ok()
}

/// Read-only view of the board, score and game-over state
#[derive(Debug, Clone, Default)]
pub struct BoardObserver {
    selectors: GameSelectors,
    unavailable: usize,
}

impl BoardObserver {
    pub fn new(selectors: GameSelectors) -> Self {
        Self {
            selectors,
            unavailable: 0,
        }
    }

    pub fn selectors(&self) -> &GameSelectors {
        &self.selectors
    }

    /// Reads that failed and were replaced by a default
    pub fn unavailable_reads(&self) -> usize {
        self.unavailable
    }

    pub fn observe_signature<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Observation<BoardSignature> {
        match driver.query_all(&self.selectors.tiles, Extractor::ClassName) {
            Ok(classes) => Observation::Observed(BoardSignature::from_tiles(classes)),
            Err(e) => {
                debug!(error = %e, "tile query unavailable");
                Observation::Unavailable
            }
        }
    }

    pub fn observe_score<D: PageDriver + ?Sized>(&self, driver: &mut D) -> Observation<u64> {
        let text = match driver.query_text(&self.selectors.score) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "score query unavailable");
                return Observation::Unavailable;
            }
        };
        match parse_score(&text) {
            Some(score) => Observation::Observed(score),
            None => {
                debug!(text = %text.trim(), "score text not numeric");
                Observation::Unavailable
            }
        }
    }

    pub fn observe_terminal<D: PageDriver + ?Sized>(&self, driver: &mut D) -> Observation<bool> {
        match driver.query_count(&self.selectors.game_over) {
            Ok(count) => Observation::Observed(count > 0),
            Err(e) => {
                debug!(error = %e, "game-over query unavailable");
                Observation::Unavailable
            }
        }
    }

    /// Current signature, empty when the tiles cannot be read
    pub fn current_signature<D: PageDriver + ?Sized>(&mut self, driver: &mut D) -> BoardSignature {
        let observation = self.observe_signature(driver);
        self.collapse(observation)
    }

    /// Current score, 0 when unreadable
    pub fn current_score<D: PageDriver + ?Sized>(&mut self, driver: &mut D) -> u64 {
        let observation = self.observe_score(driver);
        self.collapse(observation)
    }

    /// Whether the game-over indicator is shown. A failed read is never "over".
    pub fn is_terminal<D: PageDriver + ?Sized>(&mut self, driver: &mut D) -> bool {
        let observation = self.observe_terminal(driver);
        self.collapse(observation)
    }

    fn collapse<T: Default>(&mut self, observation: Observation<T>) -> T {
        if !observation.is_available() {
            self.unavailable += 1;
        }
        observation.or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPage;

    #[test]
    fn test_signature_is_order_independent() {
        let a = BoardSignature::from_tiles(["tile tile-4", "tile tile-2"]);
        let b = BoardSignature::from_tiles(vec!["tile tile-2".to_string(), "tile tile-4".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "tile tile-2|tile tile-4");
    }

    #[test]
    fn test_signature_empty_without_tiles() {
        let sig = BoardSignature::from_tiles(Vec::<String>::new());
        assert!(sig.is_empty());
        assert_eq!(sig, BoardSignature::default());
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("1,024"), Some(1024));
        assert_eq!(parse_score("  2048\n+16"), Some(2048));
        assert_eq!(parse_score("0"), Some(0));
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("SCORE"), None);
        assert_eq!(parse_score("-4"), None);
    }

    #[test]
    fn test_reads_live_page() {
        let mut page = ScriptedPage::new();
        let mut observer = BoardObserver::default();

        let sig = observer.current_signature(&mut page);
        assert!(!sig.is_empty());
        assert_eq!(observer.current_score(&mut page), 0);
        assert!(!observer.is_terminal(&mut page));
        assert_eq!(observer.unavailable_reads(), 0);
    }

    #[test]
    fn test_failed_queries_fall_back_to_defaults() {
        let mut page = ScriptedPage::new();
        page.set_queries_failing(true);
        let mut observer = BoardObserver::default();

        assert_eq!(observer.observe_signature(&mut page), Observation::Unavailable);
        assert!(observer.current_signature(&mut page).is_empty());
        assert_eq!(observer.current_score(&mut page), 0);
        assert!(!observer.is_terminal(&mut page));
        assert_eq!(observer.unavailable_reads(), 3);
    }

    #[test]
    fn test_terminal_when_indicator_present() {
        let mut page = ScriptedPage::new().game_over_after_keys(0);
        let mut observer = BoardObserver::default();
        assert!(observer.is_terminal(&mut page));
    }
}
