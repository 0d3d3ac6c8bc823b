use core::time::Duration;

use crate::id::MAX_SEQUENCE;

/// How a sequencer waits while it holds its lock and needs the clock to
/// move forward.
///
/// Waiting happens when a millisecond's ID budget is exhausted, or while a
/// tolerated clock regression heals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backoff {
    /// Busy-wait with [`core::hint::spin_loop`]. Lowest latency, burns a core.
    Spin,
    /// Give up the time slice with [`std::thread::yield_now`].
    #[default]
    Yield,
    /// Sleep for the given duration between clock reads.
    Sleep(Duration),
}

impl Backoff {
    /// Pauses once according to the strategy.
    pub fn pause(&self) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep(d) => std::thread::sleep(*d),
        }
    }
}

/// What a sequencer does when the clock reads earlier than the timestamp of
/// the last ID it issued.
///
/// Regressions of at most `tolerance_ms` are waited out: the sequencer keeps
/// polling (with its [`Backoff`]) until the clock catches up, then continues
/// as if no time had passed. Larger regressions fail with
/// [`Error::ClockRegression`].
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockPolicy {
    tolerance_ms: u64,
}

impl ClockPolicy {
    /// Default number of milliseconds a regression may span and still be
    /// waited out.
    pub const DEFAULT_TOLERANCE_MS: u64 = 10;

    /// Waits out regressions of up to `tolerance_ms` milliseconds.
    pub const fn wait_up_to(tolerance_ms: u64) -> Self {
        Self { tolerance_ms }
    }

    /// Fails on any regression.
    pub const fn reject() -> Self {
        Self { tolerance_ms: 0 }
    }

    /// Largest regression, in milliseconds, that is waited out.
    pub const fn tolerance_ms(&self) -> u64 {
        self.tolerance_ms
    }

    pub(crate) const fn tolerates(&self, last: u64, now: u64) -> bool {
        last - now <= self.tolerance_ms
    }
}

impl Default for ClockPolicy {
    fn default() -> Self {
        Self::wait_up_to(Self::DEFAULT_TOLERANCE_MS)
    }
}

/// Tunables shared by [`DefaultSequencer`] and [`GlobalSequencer`].
///
/// ```
/// use seqflake::{Backoff, ClockPolicy, SequencerConfig};
///
/// let config = SequencerConfig::default()
///     .with_backoff(Backoff::Spin)
///     .with_clock_policy(ClockPolicy::reject())
///     .with_max_batch_size(1_000);
/// assert_eq!(config.max_batch_size(), 1_000);
/// ```
///
/// [`DefaultSequencer`]: crate::DefaultSequencer
/// [`GlobalSequencer`]: crate::GlobalSequencer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequencerConfig {
    backoff: Backoff,
    clock_policy: ClockPolicy,
    max_batch_size: usize,
}

impl SequencerConfig {
    /// Default upper bound on a single batch: sixteen full milliseconds of
    /// one machine's sequence space.
    pub const DEFAULT_MAX_BATCH_SIZE: usize = MAX_SEQUENCE as usize * 16;

    /// Sets how a caller waits for the clock while a millisecond is
    /// exhausted or a tolerated regression is waited out.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets how far the clock may move backwards before generation fails
    /// with [`Error::ClockRegression`].
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    #[must_use]
    pub const fn with_clock_policy(mut self, clock_policy: ClockPolicy) -> Self {
        self.clock_policy = clock_policy;
        self
    }

    /// Caps how many IDs one `next_sequences` call may hold the lock for.
    ///
    /// A batch keeps every other caller waiting until it is drained, so the
    /// cap bounds that wait.
    #[must_use]
    pub const fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// The configured [`Backoff`].
    pub const fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// The configured [`ClockPolicy`].
    pub const fn clock_policy(&self) -> ClockPolicy {
        self.clock_policy
    }

    /// Largest size `next_sequences` accepts.
    pub const fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            backoff: Backoff::default(),
            clock_policy: ClockPolicy::default(),
            max_batch_size: Self::DEFAULT_MAX_BATCH_SIZE,
        }
    }
}
