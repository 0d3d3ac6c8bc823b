use crate::{
    error::{ParseIdError, Result},
    generator::Sequencer,
    id::SnowflakeId,
};

/// Convenience layer over any [`Sequencer`] for callers that want plain
/// integers or text instead of [`SnowflakeId`] values.
///
/// Every method is a thin wrapper over [`Sequencer::next_sequence`] or
/// [`Sequencer::next_sequences`] and inherits their ordering and batching
/// guarantees.
///
/// ```
/// use seqflake::{DefaultSequencer, SnowflakeExt, SystemClock};
///
/// let sequencer = DefaultSequencer::new(3, SystemClock::default());
/// let raw = sequencer.next_id().unwrap();
/// let id = sequencer.parse(raw);
/// assert_eq!(id.machine_id(), 3);
///
/// let text = sequencer.next_id_string().unwrap();
/// assert_eq!(sequencer.parse_str(&text).unwrap().machine_id(), 3);
/// ```
pub trait SnowflakeExt: Sequencer {
    /// Generates the next ID as its raw `u64` value.
    ///
    /// # Errors
    ///
    /// See [`Sequencer::next_sequence`].
    fn next_id(&self) -> Result<u64> {
        self.next_sequence().map(u64::from)
    }

    /// Reserves a batch of `size` IDs yielded as raw `u64` values.
    ///
    /// # Errors
    ///
    /// See [`Sequencer::next_sequences`].
    fn next_ids(&self, size: usize) -> Result<impl Iterator<Item = Result<u64>>> {
        Ok(self
            .next_sequences(size)?
            .map(|id| id.map(u64::from)))
    }

    /// Generates the next ID in its fixed-width radix-36 text form.
    ///
    /// # Errors
    ///
    /// See [`Sequencer::next_sequence`].
    fn next_id_string(&self) -> Result<String> {
        self.next_sequence().map(|id| id.to_radix36())
    }

    /// Reserves a batch of `size` IDs yielded in radix-36 text form.
    ///
    /// # Errors
    ///
    /// See [`Sequencer::next_sequences`].
    fn next_id_strings(&self, size: usize) -> Result<impl Iterator<Item = Result<String>>> {
        Ok(self
            .next_sequences(size)?
            .map(|id| id.map(|id| id.to_radix36())))
    }

    /// Reinterprets a raw value as an ID. No validation is performed.
    fn parse(&self, raw: u64) -> SnowflakeId {
        SnowflakeId::from_raw(raw)
    }

    /// Decodes the radix-36 text form produced by
    /// [`SnowflakeExt::next_id_string`].
    ///
    /// # Errors
    ///
    /// See [`SnowflakeId::from_radix36`].
    fn parse_str(&self, s: &str) -> Result<SnowflakeId, ParseIdError> {
        SnowflakeId::from_radix36(s)
    }
}

impl<S> SnowflakeExt for S where S: Sequencer + ?Sized {}
