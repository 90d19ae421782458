//! Escape heuristic: when the primary direction left the board unchanged,
//! try the remaining directions before calling the step ineffective.

use std::time::Duration;
use tracing::debug;

use crate::direction::Direction;
use crate::driver::PageDriver;
use crate::error::DriverError;
use crate::observer::{BoardObserver, BoardSignature};

/// Whether and how alternates are probed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapePolicy {
    Disabled,
    ProbeAlternates { settle: Duration },
}

/// An alternate that moved the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escape {
    pub direction: Direction,
    pub signature: BoardSignature,
    /// Probes sent, including the successful one
    pub probes: usize,
}

impl EscapePolicy {
    pub fn from_switch(enabled: bool, settle: Duration) -> Self {
        if enabled {
            EscapePolicy::ProbeAlternates { settle }
        } else {
            EscapePolicy::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, EscapePolicy::ProbeAlternates { .. })
    }

    /// Press each alternate in turn until the signature moves off `baseline`.
    ///
    /// Returns `Ok(None)` when the policy is disabled or no alternate helped.
    /// A failed key press aborts the probe.
    pub fn probe<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        observer: &mut BoardObserver,
        alternates: &[Direction],
        baseline: &BoardSignature,
    ) -> Result<Option<Escape>, DriverError> {
        let settle = match self {
            EscapePolicy::Disabled => return Ok(None),
            EscapePolicy::ProbeAlternates { settle } => *settle,
        };

        for (i, direction) in alternates.iter().copied().enumerate() {
            driver.send_key(direction.key())?;
            driver.wait(settle);
            let signature = observer.current_signature(driver);
            if &signature != baseline {
                debug!(%direction, probes = i + 1, "escape found");
                return Ok(Some(Escape {
                    direction,
                    signature,
                    probes: i + 1,
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{KeyResponse, ScriptedPage};
    use Direction::*;

    #[test]
    fn test_disabled_sends_nothing() {
        let mut page = ScriptedPage::new();
        let mut observer = BoardObserver::default();
        let baseline = observer.current_signature(&mut page);

        let found = EscapePolicy::Disabled
            .probe(&mut page, &mut observer, &[Left, Right, Down], &baseline)
            .unwrap();
        assert!(found.is_none());
        assert!(page.keys().is_empty());
    }

    #[test]
    fn test_first_changing_alternate_wins() {
        let mut page = ScriptedPage::new().script([KeyResponse::NoChange, KeyResponse::Change]);
        let mut observer = BoardObserver::default();
        let baseline = observer.current_signature(&mut page);
        let policy = EscapePolicy::from_switch(true, Duration::from_millis(35));

        let found = policy
            .probe(&mut page, &mut observer, &[Left, Right, Down], &baseline)
            .unwrap()
            .expect("second probe changes the board");
        assert_eq!(found.direction, Right);
        assert_eq!(found.probes, 2);
        assert_ne!(found.signature, baseline);
        assert_eq!(page.keys(), &["ArrowLeft", "ArrowRight"]);
    }

    #[test]
    fn test_all_alternates_blocked() {
        let mut page = ScriptedPage::new();
        let mut observer = BoardObserver::default();
        let baseline = observer.current_signature(&mut page);
        let policy = EscapePolicy::from_switch(true, Duration::from_millis(35));

        let found = policy
            .probe(&mut page, &mut observer, &[Up, Down, Right], &baseline)
            .unwrap();
        assert!(found.is_none());
        assert_eq!(page.keys().len(), 3);
    }

    #[test]
    fn test_key_failure_propagates() {
        let mut page = ScriptedPage::new().fail_key_at(1);
        let mut observer = BoardObserver::default();
        let baseline = BoardSignature::default();
        let policy = EscapePolicy::from_switch(true, Duration::from_millis(35));

        let result = policy.probe(&mut page, &mut observer, &[Up, Down, Right], &baseline);
        assert!(matches!(result, Err(DriverError::Input { .. })));
    }
}
