use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time source for everything that waits. Production code sleeps for real;
/// tests advance a `ManualClock` instead.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock whose `sleep` returns immediately and advances virtual time.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Shortest interval `poll_with_timeout` will sleep between checks.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Cooperative poll-with-timeout.
///
/// Sleeps `interval` (at least `MIN_POLL_INTERVAL`, clipped to the
/// remaining budget), then runs `check`;
/// repeats until `check` yields a value, returns an error, or `timeout` has
/// elapsed on `clock`. `Ok(None)` means the timeout ran out.
pub fn poll_with_timeout<T, E>(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut check: impl FnMut() -> Result<Option<T>, E>,
) -> Result<Option<T>, E> {
    let deadline = clock.now() + timeout;
    let interval = interval.max(MIN_POLL_INTERVAL);

    loop {
        let now = clock.now();
        if now >= deadline {
            return Ok(None);
        }
        clock.sleep(interval.min(deadline - now));
        if let Some(found) = check()? {
            return Ok(Some(found));
        }
    }
}
