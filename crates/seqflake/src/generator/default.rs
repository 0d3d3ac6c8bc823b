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
    id::{MAX_SEQUENCE, SnowflakeId},
    machine::{machine_id_from_env, normalize_machine_id},
    time::TimeSource,
};

/// A lock-based Snowflake sequencer bound to one fixed machine ID.
///
/// Every ID carries the same machine ID. Within one millisecond the sequence
/// counts up from zero; once [`MAX_SEQUENCE`] IDs have been issued in a
/// millisecond, the next caller waits (holding the lock) until the clock
/// advances.
///
/// Clones share state: IDs from all clones of one sequencer are unique and
/// ordered with respect to each other.
///
/// ## Recommended When
/// - Each process or worker owns a distinct machine ID
/// - The machine ID must identify the producer
///
/// ## See Also
/// - [`GlobalSequencer`]
///
/// [`GlobalSequencer`]: crate::GlobalSequencer
#[derive(Clone, Debug)]
pub struct DefaultSequencer<T>
where
    T: TimeSource,
{
    state: Shared,
    engine: Engine<T>,
    machine_id: u16,
}

impl<T> DefaultSequencer<T>
where
    T: TimeSource,
{
    /// Creates a sequencer for `machine_id` with the default
    /// [`SequencerConfig`].
    ///
    /// `machine_id` is folded into range with [`normalize_machine_id`].
    ///
    /// # Example
    /// ```
    /// use seqflake::{DefaultSequencer, SystemClock};
    ///
    /// let sequencer = DefaultSequencer::new(7, SystemClock::default());
    /// let id = sequencer.next_sequence().unwrap();
    /// assert_eq!(id.machine_id(), 7);
    /// ```
    pub fn new(machine_id: i64, clock: T) -> Self {
        Self::with_config(machine_id, clock, SequencerConfig::default())
    }

    /// Creates a sequencer for `machine_id` with an explicit configuration.
    pub fn with_config(machine_id: i64, clock: T, config: SequencerConfig) -> Self {
        let machine_id = normalize_machine_id(machine_id);
        Self::from_state(State::fresh(machine_id), clock, config)
    }

    /// Creates a sequencer whose machine ID comes from
    /// [`machine_id_from_env`].
    pub fn from_env(clock: T, config: SequencerConfig) -> Self {
        let machine_id = machine_id_from_env();
        Self::from_state(State::fresh(machine_id), clock, config)
    }

    /// Creates a sequencer that resumes after an already issued ID.
    ///
    /// The next ID will be strictly greater than
    /// `(timestamp, machine_id, sequence)`. Useful to continue from a
    /// persisted high-water mark.
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
            machine_id: state.machine_id,
            state: engine::shared(state),
            engine: Engine::new(clock, config, state.machine_id),
        }
    }

    /// The fixed machine ID of this sequencer.
    pub const fn machine_id(&self) -> u16 {
        self.machine_id
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
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(machine_id = self.machine_id)))]
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
    ///
    /// # Example
    /// ```
    /// use seqflake::{DefaultSequencer, SystemClock};
    ///
    /// let sequencer = DefaultSequencer::new(1, SystemClock::default());
    /// let ids = sequencer
    ///     .next_sequences(3)
    ///     .unwrap()
    ///     .collect::<Result<Vec<_>, _>>()
    ///     .unwrap();
    /// assert_eq!(ids.len(), 3);
    /// assert!(ids.windows(2).all(|w| w[0] < w[1]));
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(machine_id = self.machine_id)))]
    pub fn next_sequences(&self, size: usize) -> Result<SequenceBatch<'_, T>> {
        check_batch_size(size, self.engine.config().max_batch_size())?;
        let state = engine::lock(&self.state)?;
        Ok(SequenceBatch::new(&self.engine, state, Self::step, size))
    }

    fn step(engine: &Engine<T>, state: &mut State) -> Result<SnowflakeId> {
        let now = engine.observe(state.last_timestamp)?;
        let (timestamp, sequence) = match state.last_timestamp {
            Some(last) if now == last => {
                let next = state.sequence + 1;
                if next < MAX_SEQUENCE {
                    (last, next)
                } else {
                    (engine.wait_next_millis(last)?, 0)
                }
            }
            _ => (now, 0),
        };
        let machine_id = state.machine_id;
        engine.issue(state, timestamp, machine_id, sequence)
    }
}

impl<T> Sequencer for DefaultSequencer<T>
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
