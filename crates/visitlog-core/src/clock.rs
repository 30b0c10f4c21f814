use jiff::Timestamp;
use std::sync::{Arc, Mutex, PoisonError};

/// Source of the visit time recorded for a batch.
pub trait Clock: Send + Sync {
    /// Returns the current time of the clock.
    fn now(&self) -> Timestamp;

    /// Returns the current time as whole seconds since the Unix epoch.
    ///
    /// Instants before the epoch saturate to `0`.
    fn unix_seconds(&self) -> u64 {
        u64::try_from(self.now().as_second()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            inner: Arc::new(Mutex::new(now)),
        }
    }

    /// A clock stopped at `second` seconds past the epoch.
    ///
    /// Seconds outside the range jiff can represent fall back to the epoch.
    pub fn at_second(second: i64) -> Self {
        Self::new(Timestamp::from_second(second).unwrap_or(Timestamp::UNIX_EPOCH))
    }

    pub fn set(&self, now: Timestamp) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn set_second(&self, second: i64) {
        self.set(Timestamp::from_second(second).unwrap_or(Timestamp::UNIX_EPOCH));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
