use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::browser::error::BrowserError;
use crate::browser::handle::BrowserHandle;
use crate::dom::dom_model::NodeId;
use crate::guard::clock::Clock;
use crate::guard::typing_guard::{GuardReport, TypingGuard};

pub const DEFAULT_TYPING_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    InUse,
    Closed,
}

/// One attached page plus the state that has to live as long as it does.
///
/// All operations on the page go through `begin()`/`finish()`, so a second
/// operation cannot start while one is running, and nothing runs after
/// `close()`.
pub struct Session<B: BrowserHandle> {
    browser: B,
    clock: Box<dyn Clock>,
    state: SessionState,
    last_fill_at: Option<Instant>,
    typing_window: Duration,
}

impl<B: BrowserHandle> Session<B> {
    pub fn open(browser: B, clock: Box<dyn Clock>) -> Self {
        debug!("session opened");
        Self {
            browser,
            clock,
            state: SessionState::Open,
            last_fill_at: None,
            typing_window: DEFAULT_TYPING_WINDOW,
        }
    }

    pub fn with_typing_window(mut self, window: Duration) -> Self {
        self.typing_window = window;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn begin(&mut self) -> Result<(), BrowserError> {
        match self.state {
            SessionState::Open => {
                self.state = SessionState::InUse;
                Ok(())
            }
            SessionState::InUse => Err(BrowserError::SessionBusy),
            SessionState::Closed => Err(BrowserError::SessionClosed),
        }
    }

    pub fn finish(&mut self) {
        if self.state == SessionState::InUse {
            self.state = SessionState::Open;
        }
    }

    /// Run `op` between `begin()` and `finish()`.
    pub fn run<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, BrowserError>,
    ) -> Result<T, BrowserError> {
        self.begin()?;
        let result = op(self);
        self.finish();
        result
    }

    /// Detach from the browser. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), BrowserError> {
        match self.state {
            SessionState::Closed => Ok(()),
            SessionState::InUse => Err(BrowserError::SessionBusy),
            SessionState::Open => {
                self.state = SessionState::Closed;
                self.browser.disconnect()?;
                info!("session closed");
                Ok(())
            }
        }
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    pub fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }

    /// Record that a fill or type operation just completed.
    pub fn mark_filled(&mut self) {
        self.last_fill_at = Some(self.clock.now());
    }

    /// Whether a fill completed within the typing window.
    pub fn typing_recently_observed(&self) -> bool {
        self.last_fill_at
            .is_some_and(|at| self.clock.now().saturating_duration_since(at) < self.typing_window)
    }

    /// Run `guard` against the live value of `node`.
    pub fn watch_input(&mut self, guard: &TypingGuard, node: NodeId) -> GuardReport {
        let Session { browser, clock, .. } = self;
        guard.watch(clock.as_ref(), || browser.read_value(node))
    }
}
