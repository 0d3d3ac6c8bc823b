use core::{
    cmp::Ordering,
    sync::atomic::{self, AtomicU16},
};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{error, trace, warn};

use crate::{
    config::SequencerConfig,
    error::{Error, Result},
    generator::mutex::{Mutex, MutexGuard},
    id::{MAX_TIMESTAMP, SnowflakeId},
    time::TimeSource,
};

/// Mutable generator state. Always accessed under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct State {
    /// Timestamp of the last issued ID; `None` before the first one.
    pub(crate) last_timestamp: Option<u64>,
    pub(crate) machine_id: u16,
    pub(crate) sequence: u16,
}

impl State {
    pub(crate) const fn fresh(machine_id: u16) -> Self {
        Self {
            last_timestamp: None,
            machine_id,
            sequence: 0,
        }
    }

    pub(crate) const fn resumed(timestamp: u64, machine_id: u16, sequence: u16) -> Self {
        Self {
            last_timestamp: Some(timestamp),
            machine_id,
            sequence,
        }
    }
}

#[cfg(feature = "cache-padded")]
pub(crate) type Shared = Arc<crossbeam_utils::CachePadded<Mutex<State>>>;
#[cfg(not(feature = "cache-padded"))]
pub(crate) type Shared = Arc<Mutex<State>>;

pub(crate) fn shared(state: State) -> Shared {
    #[cfg(feature = "cache-padded")]
    {
        Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(state)))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        Arc::new(Mutex::new(state))
    }
}

pub(crate) fn lock(state: &Shared) -> Result<MutexGuard<'_, State>> {
    #[cfg(feature = "parking-lot")]
    {
        Ok(state.lock())
    }
    #[cfg(not(feature = "parking-lot"))]
    {
        Ok(state.lock()?)
    }
}

/// Clock handling shared by both sequencers.
#[derive(Clone, Debug)]
pub(crate) struct Engine<T> {
    clock: T,
    config: SequencerConfig,
    /// Machine ID of the latest issued ID, readable without the lock.
    machine_id: Arc<AtomicU16>,
}

impl<T> Engine<T>
where
    T: TimeSource,
{
    pub(crate) fn new(clock: T, config: SequencerConfig, machine_id: u16) -> Self {
        Self {
            clock,
            config,
            machine_id: Arc::new(AtomicU16::new(machine_id)),
        }
    }

    pub(crate) const fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Reads the clock and returns a value `>= last`.
    ///
    /// A reading behind `last` is either waited out or rejected according to
    /// the configured [`ClockPolicy`].
    ///
    /// [`ClockPolicy`]: crate::ClockPolicy
    pub(crate) fn observe(&self, last: Option<u64>) -> Result<u64> {
        let now = self.clock.current_millis();
        let Some(last) = last else {
            return Ok(now);
        };
        match now.cmp(&last) {
            Ordering::Less => self.cold_clock_behind(last, now),
            Ordering::Equal | Ordering::Greater => Ok(now),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, last: u64, now: u64) -> Result<u64> {
        let policy = self.config.clock_policy();
        if !policy.tolerates(last, now) {
            #[cfg(feature = "tracing")]
            error!(
                last,
                now,
                tolerance_ms = policy.tolerance_ms(),
                "clock moved backwards beyond tolerance"
            );
            return Err(Error::ClockRegression { last, now });
        }

        #[cfg(feature = "tracing")]
        warn!(last, now, "clock moved backwards, waiting for it to catch up");

        loop {
            self.config.backoff().pause();
            let now = self.clock.current_millis();
            if now >= last {
                return Ok(now);
            }
            if !policy.tolerates(last, now) {
                return Err(Error::ClockRegression { last, now });
            }
        }
    }

    /// Blocks until the clock passes `last`. Called with the lock held once
    /// the current millisecond's budget is spent.
    ///
    /// A regression seen while waiting is subject to the same
    /// [`ClockPolicy`] as [`Engine::observe`].
    ///
    /// [`ClockPolicy`]: crate::ClockPolicy
    pub(crate) fn wait_next_millis(&self, last: u64) -> Result<u64> {
        #[cfg(feature = "tracing")]
        trace!(last, "id budget exhausted, waiting for next millisecond");

        let policy = self.config.clock_policy();
        loop {
            let now = self.clock.current_millis();
            if now > last {
                return Ok(now);
            }
            if now < last && !policy.tolerates(last, now) {
                #[cfg(feature = "tracing")]
                error!(
                    last,
                    now,
                    tolerance_ms = policy.tolerance_ms(),
                    "clock moved backwards beyond tolerance while waiting for next millisecond"
                );
                return Err(Error::ClockRegression { last, now });
            }
            self.config.backoff().pause();
        }
    }

    /// Machine ID of the most recently issued ID.
    pub(crate) fn last_machine_id(&self) -> u16 {
        self.machine_id.load(atomic::Ordering::Relaxed)
    }

    /// Records `(timestamp, machine_id, sequence)` as the latest issued ID and
    /// returns it. Leaves `state` untouched on error.
    pub(crate) fn issue(
        &self,
        state: &mut State,
        timestamp: u64,
        machine_id: u16,
        sequence: u16,
    ) -> Result<SnowflakeId> {
        if timestamp > MAX_TIMESTAMP {
            return Err(Error::TimestampOverflow { timestamp });
        }
        *state = State::resumed(timestamp, machine_id, sequence);
        self.machine_id.store(machine_id, atomic::Ordering::Relaxed);
        Ok(SnowflakeId::from_components(timestamp, machine_id, sequence))
    }
}
