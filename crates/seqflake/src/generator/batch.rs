use core::{fmt, iter::FusedIterator};

use crate::{
    error::{Error, Result},
    generator::{
        engine::{Engine, State},
        mutex::MutexGuard,
    },
    id::SnowflakeId,
    time::TimeSource,
};

pub(crate) type Step<T> = fn(&Engine<T>, &mut State) -> Result<SnowflakeId>;

/// A reserved run of IDs returned by [`Sequencer::next_sequences`].
///
/// The batch owns the sequencer's lock. Other callers block until it is
/// exhausted or dropped, so drain it promptly.
///
/// [`Sequencer::next_sequences`]: crate::Sequencer::next_sequences
#[must_use = "the batch holds the sequencer lock until dropped"]
pub struct SequenceBatch<'a, T>
where
    T: TimeSource,
{
    engine: &'a Engine<T>,
    guard: MutexGuard<'a, State>,
    step: Step<T>,
    remaining: usize,
}

impl<'a, T> SequenceBatch<'a, T>
where
    T: TimeSource,
{
    pub(crate) fn new(
        engine: &'a Engine<T>,
        guard: MutexGuard<'a, State>,
        step: Step<T>,
        size: usize,
    ) -> Self {
        Self {
            engine,
            guard,
            step,
            remaining: size,
        }
    }

    /// Number of IDs still to be produced.
    pub const fn remaining(&self) -> usize {
        self.remaining
    }
}

pub(crate) fn check_batch_size(size: usize, max: usize) -> Result<()> {
    if size == 0 || size > max {
        return Err(Error::InvalidBatchSize { size, max });
    }
    Ok(())
}

impl<T> Iterator for SequenceBatch<'_, T>
where
    T: TimeSource,
{
    type Item = Result<SnowflakeId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match (self.step)(self.engine, &mut self.guard) {
            Ok(id) => {
                self.remaining -= 1;
                Some(Ok(id))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // An error ends the batch early, after yielding at least one item.
        (self.remaining.min(1), Some(self.remaining))
    }
}

impl<T> FusedIterator for SequenceBatch<'_, T> where T: TimeSource {}

impl<T> fmt::Debug for SequenceBatch<'_, T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceBatch")
            .field("state", &*self.guard)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
