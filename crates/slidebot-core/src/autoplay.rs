//! The autoplay control loop.
//!
//! One run walks `Starting -> Running -> Finished | Failed`. Each step presses
//! the next direction of the move cycle, checks whether the board moved,
//! optionally probes alternates, logs the score, emits frames at the
//! throttled rate, stops on game over and rotates the cycle after
//! [`STUCK_THRESHOLD`] ineffective steps in a row.

use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::direction::Direction;
use crate::driver::{FrameSink, PageDriver};
use crate::error::AutoplayError;
use crate::escape::EscapePolicy;
use crate::log_buffer::LogBuffer;
use crate::observer::{BoardObserver, BoardSignature};
use crate::pacing::{Clock, SystemClock, Throttle};
use crate::strategy::{format_order, MoveStrategy};

/// Consecutive ineffective steps that trigger a rotation
pub const STUCK_THRESHOLD: u32 = 3;

/// Why a run ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    GameOver,
    Exhausted,
}

/// Where a run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Starting,
    Running,
    Finished(FinishReason),
    Failed,
}

/// What happened to the primary move of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEffect {
    /// The primary direction moved the board
    Moved,
    /// The primary was blocked but this alternate moved the board
    Escaped(Direction),
    /// Nothing moved the board
    Ineffective,
}

/// Summary handed back when a run finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub reason: FinishReason,
    pub steps: usize,
    pub final_score: u64,
    pub rotations: usize,
    pub escapes: usize,
    pub ineffective_steps: usize,
    pub unavailable_reads: usize,
    pub emissions: usize,
    pub final_order: [Direction; 4],
}

#[derive(Debug, Default)]
struct Counters {
    steps: usize,
    escapes: usize,
    ineffective: usize,
    emissions: usize,
    score: u64,
}

/// A single autoplay run against one page
pub struct Autoplay<D, S, C = SystemClock> {
    config: RunConfig,
    driver: D,
    sink: S,
    clock: C,
    observer: BoardObserver,
    strategy: MoveStrategy,
    escape: EscapePolicy,
    log: LogBuffer,
    throttle: Throttle,
    phase: RunPhase,
    last_signature: BoardSignature,
    invalid_streak: u32,
    released: bool,
    counters: Counters,
}

impl<D: PageDriver, S: FrameSink> Autoplay<D, S, SystemClock> {
    /// Prepare a run on an already-loaded page, timed by the wall clock
    pub fn new(config: RunConfig, driver: D, sink: S) -> Result<Self, AutoplayError> {
        Self::with_clock(config, driver, sink, SystemClock::new())
    }
}

impl<D: PageDriver, S: FrameSink, C: Clock> Autoplay<D, S, C> {
    pub fn with_clock(
        config: RunConfig,
        driver: D,
        sink: S,
        clock: C,
    ) -> Result<Self, AutoplayError> {
        config.validate()?;
        Ok(Self {
            observer: BoardObserver::new(config.selectors.clone()),
            strategy: MoveStrategy::from_preset(config.preset),
            escape: EscapePolicy::from_switch(config.escape, config.escape_settle_delay()),
            log: LogBuffer::new(config.log_capacity),
            throttle: Throttle::new(config.frame_interval()),
            phase: RunPhase::Starting,
            last_signature: BoardSignature::default(),
            invalid_streak: 0,
            released: false,
            counters: Counters::default(),
            config,
            driver,
            sink,
            clock,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn strategy(&self) -> &MoveStrategy {
        &self.strategy
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn invalid_streak(&self) -> u32 {
        self.invalid_streak
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Play until game over, the step budget runs out, or a driver call fails.
    ///
    /// The driver is closed exactly once, whatever the outcome. A run cannot
    /// be restarted.
    pub fn run(&mut self) -> Result<RunReport, AutoplayError> {
        if self.phase != RunPhase::Starting {
            return Err(AutoplayError::Unexpected(
                "autoplay run already finished".to_string(),
            ));
        }

        let outcome = self.play();
        self.release();

        match outcome {
            Ok(reason) => {
                self.phase = RunPhase::Finished(reason);
                let report = self.report(reason);
                info!(
                    ?reason,
                    steps = report.steps,
                    score = report.final_score,
                    rotations = report.rotations,
                    "autoplay finished"
                );
                Ok(report)
            }
            Err(err) => {
                self.phase = RunPhase::Failed;
                error!(error = %err, category = %err.category(), "autoplay failed");
                self.sink.report_error(err.category(), &err.to_string());
                Err(err)
            }
        }
    }

    fn play(&mut self) -> Result<FinishReason, AutoplayError> {
        self.start()?;
        self.phase = RunPhase::Running;

        for step in 0..self.config.max_moves {
            if let Some(reason) = self.step(step)? {
                return Ok(reason);
            }
        }
        Ok(FinishReason::Exhausted)
    }

    fn start(&mut self) -> Result<(), AutoplayError> {
        info!(
            url = %self.config.url,
            preset = %self.config.preset,
            max_moves = self.config.max_moves,
            escape = self.escape.is_enabled(),
            "starting autoplay"
        );
        self.log.push("Page loaded. Starting game...");
        self.emit("Initial view")?;
        self.last_signature = self.observer.current_signature(&mut self.driver);
        Ok(())
    }

    /// Execute one step; `Some` ends the run
    fn step(&mut self, step: usize) -> Result<Option<FinishReason>, AutoplayError> {
        self.counters.steps = step + 1;

        let primary = self.strategy.next_input(step);
        self.driver.send_key(primary.key())?;
        self.driver.wait(self.config.settle_delay());

        let effect = self.detect_change(primary)?;
        debug!(step = step + 1, %primary, ?effect, streak = self.invalid_streak, "step");

        let score = self.observer.current_score(&mut self.driver);
        self.counters.score = score;
        self.log.push(format!("Move {} | Score {}", step + 1, score));

        if self.throttle.is_due(self.clock.now()) {
            self.emit(&format!("Score: {}", score))?;
        }

        if self.observer.is_terminal(&mut self.driver) {
            info!(step = step + 1, score, "game over");
            self.log.push(format!("Game over! Final score: {}", score));
            self.emit(&format!("Final Score: {}", score))?;
            return Ok(Some(FinishReason::GameOver));
        }

        if self.invalid_streak >= STUCK_THRESHOLD {
            self.strategy.rotate();
            let order = format_order(&self.strategy.order());
            info!(order = %order, "strategy rotated");
            self.log.push(format!("Strategy rotated: {}", order));
            self.invalid_streak = 0;
        }

        Ok(None)
    }

    fn detect_change(&mut self, primary: Direction) -> Result<StepEffect, AutoplayError> {
        let signature = self.observer.current_signature(&mut self.driver);
        if signature != self.last_signature {
            self.accept(signature);
            return Ok(StepEffect::Moved);
        }

        let alternates = self.strategy.alternates(primary);
        let escape = self.escape.probe(
            &mut self.driver,
            &mut self.observer,
            &alternates,
            &self.last_signature,
        )?;

        match escape {
            Some(found) => {
                self.counters.escapes += 1;
                self.accept(found.signature);
                Ok(StepEffect::Escaped(found.direction))
            }
            None => {
                self.invalid_streak += 1;
                self.counters.ineffective += 1;
                Ok(StepEffect::Ineffective)
            }
        }
    }

    fn accept(&mut self, signature: BoardSignature) {
        self.last_signature = signature;
        self.invalid_streak = 0;
    }

    /// Publish a screenshot and the log, restarting the throttle
    fn emit(&mut self, caption: &str) -> Result<(), AutoplayError> {
        let frame = self.driver.screenshot()?;
        self.sink.publish_frame(&frame, caption);
        self.sink.publish_log(self.log.lines());
        self.throttle.mark(self.clock.now());
        self.counters.emissions += 1;
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.driver.close() {
            warn!(error = %e, "failed to release browser page");
        }
    }

    fn report(&self, reason: FinishReason) -> RunReport {
        RunReport {
            reason,
            steps: self.counters.steps,
            final_score: self.counters.score,
            rotations: self.strategy.rotations(),
            escapes: self.counters.escapes,
            ineffective_steps: self.counters.ineffective,
            unavailable_reads: self.observer.unavailable_reads(),
            emissions: self.counters.emissions,
            final_order: self.strategy.order(),
        }
    }
}
