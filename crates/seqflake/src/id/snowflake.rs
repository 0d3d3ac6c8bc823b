use core::{fmt, str::FromStr};

use crate::{
    error::{Error, ParseIdError, Result},
    id::radix36,
};

/// Number of bits reserved for the machine ID field.
pub const MACHINE_ID_BITS: u32 = 10;

/// Number of bits reserved for the per-millisecond sequence field.
pub const SEQUENCE_BITS: u32 = 12;

/// Number of bits reserved for the timestamp field.
pub const TIMESTAMP_BITS: u32 = 41;

/// Exclusive upper bound of the machine ID field.
pub const MAX_MACHINE_ID: u16 = 1 << MACHINE_ID_BITS;

/// Exclusive upper bound of the sequence field.
pub const MAX_SEQUENCE: u16 = 1 << SEQUENCE_BITS;

/// Largest timestamp (milliseconds since the clock's epoch) an ID can carry.
pub const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;

/// A 64-bit Snowflake ID.
///
/// - 1 bit reserved
/// - 41 bits timestamp (ms since the epoch of the generating clock)
/// - 10 bits machine ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21             12 11             0
///              +--------------+----------------+-----------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | machine ID (10) | sequence (12) |
///              +--------------+----------------+-----------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Because the fields are packed most-significant first, comparing two IDs
/// compares `(timestamp, machine_id, sequence)` lexicographically.
///
/// # Example
///
/// ```
/// use seqflake::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.machine_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(SnowflakeId::from_raw(id.to_raw()), id);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = MAX_TIMESTAMP;

    /// Bitmask for the 10-bit machine ID field. Occupies bits 12 through 21.
    pub const MACHINE_ID_MASK: u64 = (1 << MACHINE_ID_BITS) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = MACHINE_ID_BITS + SEQUENCE_BITS;

    /// Number of bits to shift the machine ID to its position (bit 12).
    pub const MACHINE_ID_SHIFT: u32 = SEQUENCE_BITS;

    /// The reserved most significant bit. Always clear in generated IDs.
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Packs the three fields into an ID.
    ///
    /// Out-of-range fields are a programming error: they trip a debug
    /// assertion and are masked to their field width in release builds. Use
    /// [`Self::try_from_components`] for untrusted input.
    pub const fn from_components(timestamp: u64, machine_id: u16, sequence: u16) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(
            (machine_id as u64) <= Self::MACHINE_ID_MASK,
            "machine_id overflow"
        );
        debug_assert!((sequence as u64) <= Self::SEQUENCE_MASK, "sequence overflow");

        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let machine_id = (machine_id as u64 & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = sequence as u64 & Self::SEQUENCE_MASK;
        Self {
            id: timestamp | machine_id | sequence,
        }
    }

    /// Packs the three fields into an ID, rejecting values that do not fit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOverflow`] naming the first field that is out of
    /// range.
    pub fn try_from_components(timestamp: u64, machine_id: u16, sequence: u16) -> Result<Self> {
        check_field("timestamp", timestamp, Self::TIMESTAMP_MASK)?;
        check_field("machine_id", u64::from(machine_id), Self::MACHINE_ID_MASK)?;
        check_field("sequence", u64::from(sequence), Self::SEQUENCE_MASK)?;
        Ok(Self::from_components(timestamp, machine_id, sequence))
    }

    /// Extracts the timestamp (ms since the generating clock's epoch).
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the machine ID.
    pub const fn machine_id(&self) -> u16 {
        ((self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK) as u16
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u16 {
        (self.id & Self::SEQUENCE_MASK) as u16
    }

    /// Returns the packed 64-bit value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a packed 64-bit value without validation.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns `true` if the reserved bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }

    /// Converts the timestamp back to milliseconds since the UNIX epoch, given
    /// the epoch (also in UNIX milliseconds) of the clock that produced it.
    ///
    /// Saturates at `u64::MAX`.
    pub const fn unix_millis(&self, epoch_millis: u64) -> u64 {
        epoch_millis.saturating_add(self.timestamp())
    }

    /// Encodes the ID in its fixed-width radix-36 text form.
    ///
    /// Strings produced for two IDs compare in the same order as the IDs.
    ///
    /// ```
    /// use seqflake::SnowflakeId;
    ///
    /// let a = SnowflakeId::from_components(7, 0, 35);
    /// let b = SnowflakeId::from_components(7, 1, 0);
    /// assert_eq!(a.to_radix36().len(), 13);
    /// assert!(a.to_radix36() < b.to_radix36());
    /// ```
    pub fn to_radix36(&self) -> String {
        radix36::encode(self.id)
    }

    /// Decodes the radix-36 text form (either letter case, padding optional).
    ///
    /// # Errors
    ///
    /// Returns a [`ParseIdError`] if the text is empty, too long, contains a
    /// non radix-36 character, overflows 64 bits, or sets the reserved bit.
    pub fn from_radix36(s: &str) -> Result<Self, ParseIdError> {
        radix36::decode(s).and_then(Self::checked)
    }

    fn checked(raw: u64) -> Result<Self, ParseIdError> {
        let id = Self::from_raw(raw);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(ParseIdError::ReservedBitSet { raw })
        }
    }
}

fn check_field(field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(Error::FieldOverflow { field, value, max });
    }
    Ok(())
}

impl FromStr for SnowflakeId {
    type Err = ParseIdError;

    /// Parses the decimal form produced by [`fmt::Display`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError::Empty);
        }
        let mut raw: u64 = 0;
        for (index, ch) in s.char_indices() {
            let digit = ch
                .to_digit(10)
                .ok_or(ParseIdError::InvalidDigit { ch, index })?;
            raw = raw
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or(ParseIdError::Overflow)?;
        }
        Self::checked(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
