/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `seqflake` can emit while generating or
/// constructing IDs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The clock reported a time earlier than the last issued timestamp by
    /// more than the configured tolerance.
    ///
    /// Issuing an ID at `now` could collide with an ID that was already handed
    /// out, so generation is refused instead.
    #[error("clock moved backwards: last issued timestamp {last}, clock reads {now}")]
    ClockRegression {
        /// Timestamp of the most recently issued ID.
        last: u64,
        /// Timestamp the clock returned.
        now: u64,
    },

    /// A batch was requested with a size of zero or above the configured
    /// limit.
    #[error("invalid batch size {size}: must be between 1 and {max}")]
    InvalidBatchSize {
        /// Requested batch size.
        size: usize,
        /// Largest batch the sequencer accepts.
        max: usize,
    },

    /// The clock value does not fit the 41-bit timestamp field.
    #[error("timestamp {timestamp} exceeds the 41-bit timestamp field")]
    TimestampOverflow {
        /// The offending timestamp.
        timestamp: u64,
    },

    /// A component passed to an explicit constructor is out of range.
    #[error("{field} {value} is out of range (max = {max})")]
    FieldOverflow {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was supplied.
        value: u64,
        /// Largest value the field can hold.
        max: u64,
    },

    /// The system clock reads earlier than the requested epoch.
    #[error("system clock is earlier than the configured epoch")]
    ClockBeforeEpoch,

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("sequencer lock poisoned")]
    LockPoisoned,
}

/// Errors that can occur while decoding the text forms of a
/// [`SnowflakeId`].
///
/// [`SnowflakeId`]: crate::SnowflakeId
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input string was empty.
    #[error("empty id string")]
    Empty,

    /// The input has more digits than any 64-bit value needs.
    #[error("id string has {len} characters, at most {max} allowed")]
    TooLong {
        /// Length of the input.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// The input contains a character outside the accepted alphabet.
    #[error("invalid character {ch:?} at position {index}")]
    InvalidDigit {
        /// The offending character.
        ch: char,
        /// Byte offset of the character.
        index: usize,
    },

    /// The decoded value does not fit in 64 bits.
    #[error("id value overflows 64 bits")]
    Overflow,

    /// The decoded value sets the reserved most significant bit.
    #[error("id {raw} sets the reserved bit")]
    ReservedBitSet {
        /// The decoded raw value.
        raw: u64,
    },
}

/// Errors produced by [`Hashids`].
///
/// [`Hashids`]: crate::Hashids
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum HashidsError {
    /// The custom alphabet has too few distinct characters.
    #[error("alphabet has {len} distinct characters, at least {min} required")]
    AlphabetTooShort {
        /// Number of distinct characters supplied.
        len: usize,
        /// Minimum number of distinct characters.
        min: usize,
    },

    /// The custom alphabet contains a character reserved by the encoding.
    #[error("alphabet cannot contain {ch:?}")]
    ReservedAlphabetChar {
        /// The offending character.
        ch: char,
    },

    /// The input is not a hash produced by this encoder.
    #[error("input is not a valid hash for this salt and alphabet")]
    InvalidHash,

    /// The input to [`Hashids::encode_hex`] is not a hexadecimal string.
    ///
    /// [`Hashids::encode_hex`]: crate::Hashids::encode_hex
    #[error("input is not a hexadecimal string")]
    InvalidHex,
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::PoisonError;

// Collapse every poisoned guard into `LockPoisoned`
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
