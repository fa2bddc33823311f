use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::guard::clock::{Clock, MIN_POLL_INTERVAL, poll_with_timeout};

// ============================================================================
// TypingGuard: hold a click until a linked input stops changing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardState {
    Idle,
    Monitoring,
    Stable,
    Timeout,
}

/// Why the guard let the click through. Every exit proceeds to click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardExit {
    /// Value held still for the required number of polls.
    Settled,
    /// Input stayed empty through the initial wait.
    NothingTyped,
    /// Cycle budget ran out while the value kept changing.
    CycleLimit,
    /// Reading the value failed; monitoring was abandoned.
    ProbeFailed(String),
}

impl fmt::Display for GuardExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardExit::Settled => write!(f, "typing settled"),
            GuardExit::NothingTyped => write!(f, "no typing detected"),
            GuardExit::CycleLimit => write!(f, "maximum wait reached"),
            GuardExit::ProbeFailed(e) => write!(f, "value probe failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardReport {
    pub state: GuardState,
    pub exit: GuardExit,
    /// States entered, starting at `Idle`.
    pub path: Vec<GuardState>,
    /// Number of value reads, the initial read included.
    pub polls: u32,
    pub elapsed: Duration,
}

impl GuardReport {
    /// The guard never blocks a click; this is always `true`.
    pub fn proceed(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    pub poll_interval: Duration,
    pub empty_wait: Duration,
    pub stable_polls: u32,
    pub max_cycles: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            empty_wait: Duration::from_secs(5),
            stable_polls: 3,
            max_cycles: 30,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypingGuard {
    pub config: GuardConfig,
}

struct Run<'c> {
    clock: &'c dyn Clock,
    started: std::time::Instant,
    path: Vec<GuardState>,
    polls: u32,
}

impl Run<'_> {
    fn enter(&mut self, state: GuardState) {
        debug!(?state, polls = self.polls, "typing guard transition");
        self.path.push(state);
    }

    fn finish(mut self, state: GuardState, exit: GuardExit) -> GuardReport {
        self.enter(state);
        GuardReport {
            state,
            exit,
            path: self.path,
            polls: self.polls,
            elapsed: self.clock.now().saturating_duration_since(self.started),
        }
    }
}

impl TypingGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Watch an input through `probe` until its value stops changing.
    ///
    /// An empty input gets one bounded wait for content to appear; if none
    /// does there is nothing to wait for. Otherwise the value is sampled
    /// once per interval and the click is released once it has been unchanged
    /// for `stable_polls` consecutive samples, or when `max_cycles` samples
    /// have been taken. A failing probe releases the click immediately.
    pub fn watch<E: fmt::Display>(
        &self,
        clock: &dyn Clock,
        mut probe: impl FnMut() -> Result<String, E>,
    ) -> GuardReport {
        let mut run = Run {
            clock,
            started: clock.now(),
            path: vec![GuardState::Idle],
            polls: 0,
        };

        // A failed first read is treated as an empty field.
        run.polls += 1;
        let mut last = probe().unwrap_or_default();

        if last.trim().is_empty() {
            debug!("input empty, waiting for typing to start");
            let polls = &mut run.polls;
            let appeared = poll_with_timeout(clock, self.config.empty_wait, self.config.poll_interval, || {
                *polls += 1;
                probe().map(|v| (!v.trim().is_empty()).then_some(v))
            });
            match appeared {
                Ok(Some(value)) => last = value,
                Ok(None) => {
                    info!("no typing detected, proceeding");
                    return run.finish(GuardState::Stable, GuardExit::NothingTyped);
                }
                Err(e) => {
                    warn!(error = %e, "value probe failed while waiting for input");
                    return run.finish(GuardState::Timeout, GuardExit::ProbeFailed(e.to_string()));
                }
            }
        }

        run.enter(GuardState::Monitoring);
        let interval = self.config.poll_interval.max(MIN_POLL_INTERVAL);
        let required = self.config.stable_polls.max(1);
        let mut stable = 0;

        for _cycle in 0..self.config.max_cycles {
            clock.sleep(interval);
            run.polls += 1;

            let current = match probe() {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "value probe failed while monitoring typing");
                    return run.finish(GuardState::Timeout, GuardExit::ProbeFailed(e.to_string()));
                }
            };

            if current == last {
                stable += 1;
                if stable >= required {
                    info!(length = current.chars().count(), "typing appears complete");
                    return run.finish(GuardState::Stable, GuardExit::Settled);
                }
            } else {
                stable = 0;
                debug!(length = current.chars().count(), "typing in progress");
            }
            last = current;
        }

        info!("maximum typing wait reached, proceeding");
        run.finish(GuardState::Timeout, GuardExit::CycleLimit)
    }
}
