#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    config::SequencerConfig,
    error::Result,
    generator::{
        Sequencer,
        batch::{SequenceBatch, check_batch_size},
        engine::{self, Engine, Shared, State},
    },
    id::{MAX_MACHINE_ID, MAX_SEQUENCE, SnowflakeId},
    time::TimeSource,
};

/// A single process-wide Snowflake sequencer that rolls the machine ID field
/// as an extra counter.
///
/// When a millisecond's sequence space is spent, the machine ID is bumped
/// instead of waiting, which raises the per-millisecond ceiling to
/// `MAX_MACHINE_ID * MAX_SEQUENCE` IDs. Only when both fields are exhausted
/// does the caller wait (holding the lock) for the next millisecond. Each
/// new millisecond restarts at machine ID 0, sequence 0.
///
/// The machine ID in the resulting IDs is a sub-slot within this process,
/// not a stable producer identity. Two `GlobalSequencer`s in different
/// processes will collide; run exactly one per ID namespace.
///
/// ## Recommended When
/// - A single process needs more than [`MAX_SEQUENCE`] IDs per millisecond
/// - No other producer shares the ID namespace
///
/// ## See Also
/// - [`DefaultSequencer`]
///
/// [`DefaultSequencer`]: crate::DefaultSequencer
#[derive(Clone, Debug)]
pub struct GlobalSequencer<T>
where
    T: TimeSource,
{
    state: Shared,
    engine: Engine<T>,
}

impl<T> GlobalSequencer<T>
where
    T: TimeSource,
{
    /// Creates a sequencer with the default [`SequencerConfig`].
    ///
    /// # Example
    /// ```
    /// use seqflake::{GlobalSequencer, SystemClock};
    ///
    /// let sequencer = GlobalSequencer::new(SystemClock::default());
    /// let a = sequencer.next_sequence().unwrap();
    /// let b = sequencer.next_sequence().unwrap();
    /// assert!(a < b);
    /// ```
    pub fn new(clock: T) -> Self {
        Self::with_config(clock, SequencerConfig::default())
    }

    /// Creates a sequencer with an explicit configuration.
    pub fn with_config(clock: T, config: SequencerConfig) -> Self {
        Self::from_state(State::fresh(0), clock, config)
    }

    /// Creates a sequencer that resumes after an already issued ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOverflow`] if a component is out of range.
    ///
    /// [`Error::FieldOverflow`]: crate::Error::FieldOverflow
    pub fn from_components(
        timestamp: u64,
        machine_id: u16,
        sequence: u16,
        clock: T,
        config: SequencerConfig,
    ) -> Result<Self> {
        SnowflakeId::try_from_components(timestamp, machine_id, sequence)?;
        let state = State::resumed(timestamp, machine_id, sequence);
        Ok(Self::from_state(state, clock, config))
    }

    fn from_state(state: State, clock: T, config: SequencerConfig) -> Self {
        Self {
            state: engine::shared(state),
            engine: Engine::new(clock, config, state.machine_id),
        }
    }

    /// The machine ID slot of the most recently issued ID.
    ///
    /// Does not take the lock, so it can be read while a batch is alive.
    pub fn machine_id(&self) -> u16 {
        self.engine.last_machine_id()
    }

    /// The configuration this sequencer was built with.
    pub const fn config(&self) -> &SequencerConfig {
        self.engine.config()
    }

    /// Generates the next ID.
    ///
    /// See [`Sequencer::next_sequence`].
    ///
    /// # Errors
    ///
    /// Returns an error on an intolerable clock regression, a timestamp
    /// overflow, or a poisoned lock.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_sequence(&self) -> Result<SnowflakeId> {
        let mut state = engine::lock(&self.state)?;
        Self::step(&self.engine, &mut state)
    }

    /// Reserves the sequencer for a batch of `size` IDs.
    ///
    /// See [`Sequencer::next_sequences`].
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero or above the configured maximum, or
    /// if the lock is poisoned.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_sequences(&self, size: usize) -> Result<SequenceBatch<'_, T>> {
        check_batch_size(size, self.engine.config().max_batch_size())?;
        let state = engine::lock(&self.state)?;
        Ok(SequenceBatch::new(&self.engine, state, Self::step, size))
    }

    fn step(engine: &Engine<T>, state: &mut State) -> Result<SnowflakeId> {
        let now = engine.observe(state.last_timestamp)?;
        let (timestamp, machine_id, sequence) = match state.last_timestamp {
            Some(last) if now == last => {
                if state.sequence + 1 < MAX_SEQUENCE {
                    (last, state.machine_id, state.sequence + 1)
                } else if state.machine_id + 1 < MAX_MACHINE_ID {
                    (last, state.machine_id + 1, 0)
                } else {
                    (engine.wait_next_millis(last)?, 0, 0)
                }
            }
            _ => (now, 0, 0),
        };
        engine.issue(state, timestamp, machine_id, sequence)
    }
}

impl<T> Sequencer for GlobalSequencer<T>
where
    T: TimeSource,
{
    type Batch<'a>
        = SequenceBatch<'a, T>
    where
        Self: 'a;

    fn machine_id(&self) -> u16 {
        self.machine_id()
    }

    fn next_sequence(&self) -> Result<SnowflakeId> {
        self.next_sequence()
    }

    fn next_sequences(&self, size: usize) -> Result<Self::Batch<'_>> {
        self.next_sequences(size)
    }
}
