use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    error::{Error, Result},
    time::TimeSource,
};

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// Standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_ORIGIN: Duration = Duration::ZERO;

/// A wall-clock time source offset from a user-defined epoch.
///
/// Each call reads `SystemTime::now()`, so the value follows NTP corrections
/// and manual adjustments and **can move backwards**. The sequencers detect
/// that and apply their [`ClockPolicy`].
///
/// [`ClockPolicy`]: crate::ClockPolicy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch_millis: u64,
}

impl Default for SystemClock {
    /// Constructs a clock aligned to [`TWITTER_EPOCH`].
    fn default() -> Self {
        Self {
            epoch_millis: duration_millis(TWITTER_EPOCH),
        }
    }
}

impl SystemClock {
    /// Constructs a clock whose zero point is `epoch`, given as a [`Duration`]
    /// since 1970-01-01 UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the system clock currently reads
    /// earlier than `epoch`.
    ///
    /// # Example
    ///
    /// ```
    /// use seqflake::{SystemClock, TimeSource, TWITTER_EPOCH};
    ///
    /// let clock = SystemClock::with_epoch(TWITTER_EPOCH).unwrap();
    /// assert!(clock.current_millis() > 0);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let epoch_millis = duration_millis(epoch);
        if unix_millis_now() < epoch_millis {
            return Err(Error::ClockBeforeEpoch);
        }
        Ok(Self { epoch_millis })
    }

    /// The epoch of this clock in milliseconds since the UNIX epoch.
    pub const fn epoch_millis(&self) -> u64 {
        self.epoch_millis
    }
}

impl TimeSource for SystemClock {
    /// Milliseconds elapsed since the configured epoch, saturating at zero.
    fn current_millis(&self) -> u64 {
        unix_millis_now().saturating_sub(self.epoch_millis)
    }
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, duration_millis)
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
