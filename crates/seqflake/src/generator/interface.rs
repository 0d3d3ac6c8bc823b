use crate::{error::Result, id::SnowflakeId};

/// A source of Snowflake IDs tagged with a machine ID.
///
/// For a single sequencer, IDs come out strictly increasing in
/// `(timestamp, machine_id, sequence)` order, in the order callers obtain
/// them.
pub trait Sequencer {
    /// Iterator returned by [`Sequencer::next_sequences`]. Holds the
    /// sequencer's lock for as long as it lives.
    type Batch<'a>: Iterator<Item = Result<SnowflakeId>>
    where
        Self: 'a;

    /// The machine ID stamped into the IDs this sequencer issues.
    fn machine_id(&self) -> u16;

    /// Produces exactly one fresh ID.
    ///
    /// Blocks only while the current millisecond's budget is spent, or while
    /// a tolerated clock regression heals.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock went back further than the
    ///   configured tolerance
    /// - [`Error::TimestampOverflow`] if the clock no longer fits 41 bits
    /// - [`Error::LockPoisoned`] if another caller panicked while holding the
    ///   lock
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn next_sequence(&self) -> Result<SnowflakeId>;

    /// Reserves the sequencer for a batch of `size` IDs.
    ///
    /// The lock is taken once, here, and released when the returned iterator
    /// is exhausted or dropped, so no other caller's IDs interleave with the
    /// batch. IDs are produced lazily as the iterator is advanced. If
    /// generating an ID fails, the iterator yields that error and ends.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatchSize`] if `size` is zero or above the configured
    ///   maximum
    /// - [`Error::LockPoisoned`] if the lock cannot be acquired
    ///
    /// [`Error::InvalidBatchSize`]: crate::Error::InvalidBatchSize
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn next_sequences(&self, size: usize) -> Result<Self::Batch<'_>>;
}
