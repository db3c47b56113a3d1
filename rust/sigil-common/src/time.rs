//! Time sources.
//!
//! Signing, cache expiry and TTL derivation all ask a [Clock] for the current
//! instant so that tests can move time forward without sleeping.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Returns the current system time.
pub fn now() -> SystemTime {
    SystemTime::now()
}

/// Seconds elapsed since the unix epoch for the given instant. Instants
/// before the epoch read as zero.
pub fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// A source of the current wall-clock time
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> SystemTime;

    /// The current instant as a UTC datetime
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.now())
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> SystemTime {
        self.as_ref().now()
    }
}

/// The process clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        now()
    }
}

/// A [Clock] that only moves when told to. Clones share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    seconds: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `seconds` past the unix epoch
    pub fn at(seconds: u64) -> Self {
        Self {
            seconds: Arc::new(AtomicU64::new(seconds)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.seconds.fetch_add(by.as_secs(), Ordering::SeqCst);
    }

    /// Set the clock to an absolute reading
    pub fn set(&self, seconds: u64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.seconds.load(Ordering::SeqCst))
    }
}
