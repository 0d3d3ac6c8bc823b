//! Salted, reversible short-string encoding of integers ("hashids").
//!
//! Useful for exposing IDs in URLs without revealing their raw value or
//! ordering. The same salt, alphabet and minimum length must be used to
//! encode and decode.
//!
//! Values in `0..=HASHIDS_MAX_NUMBER` are encoded with the classic
//! algorithm. Values outside that range (including negatives) are split into
//! base `HASHIDS_MAX_NUMBER` limbs and marked with a trailing `=`. Parts are
//! joined with `-`.

mod alphabet;

use core::iter;

use crate::{error::HashidsError, id::SnowflakeId};
use alphabet::{Alphabet, DEFAULT_ALPHABET, consistent_shuffle};

/// Largest value encoded without the large-number extension (2^53).
pub const HASHIDS_MAX_NUMBER: i64 = 9_007_199_254_740_992;

const NUMBER_SEPARATOR: char = '-';
const LARGE_NUMBER_SUFFIX: char = '=';
const HEX_CHUNK_LEN: usize = 12;

/// A configured hashids encoder.
///
/// ```
/// use seqflake::Hashids;
///
/// let hashids = Hashids::new("great korea");
/// let hash = hashids.encode(&[1, 2, 3]);
/// assert_eq!(hashids.decode(&hash).unwrap(), vec![1, 2, 3]);
///
/// let other = Hashids::new("pepper");
/// assert!(other.decode(&hash).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hashids {
    salt: Vec<char>,
    min_length: usize,
    alphabet: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
}

impl Hashids {
    /// Creates an encoder with the default alphabet and no minimum length.
    pub fn new(salt: &str) -> Self {
        Self::with_min_length(salt, 0)
    }

    /// Creates an encoder with the default alphabet whose hashes are padded
    /// to at least `min_length` characters.
    pub fn with_min_length(salt: &str, min_length: usize) -> Self {
        let unique: Vec<char> = DEFAULT_ALPHABET.chars().collect();
        Self::build(salt, min_length, &unique)
    }

    /// Creates an encoder over a custom alphabet.
    ///
    /// # Errors
    ///
    /// Returns [`HashidsError::AlphabetTooShort`] if the alphabet has fewer
    /// than 16 distinct characters, or
    /// [`HashidsError::ReservedAlphabetChar`] if it contains a space, `-` or
    /// `=`.
    pub fn with_alphabet(
        salt: &str,
        min_length: usize,
        alphabet: &str,
    ) -> Result<Self, HashidsError> {
        let unique = Alphabet::validate(alphabet)?;
        Ok(Self::build(salt, min_length, &unique))
    }

    fn build(salt: &str, min_length: usize, unique: &[char]) -> Self {
        let salt: Vec<char> = salt.chars().collect();
        let Alphabet {
            alphabet,
            separators,
            guards,
        } = Alphabet::split(unique, &salt);
        Self {
            salt,
            min_length,
            alphabet,
            separators,
            guards,
        }
    }

    /// Encodes `numbers` into one hash. An empty slice encodes to an empty
    /// string.
    pub fn encode(&self, numbers: &[i64]) -> String {
        let mut out = String::new();
        let mut run: Vec<u64> = Vec::new();

        for &number in numbers {
            match u64::try_from(number) {
                Ok(small) if number <= HASHIDS_MAX_NUMBER => run.push(small),
                _ => {
                    if !run.is_empty() {
                        push_part(&mut out, &self.encode_run(&run));
                        run.clear();
                    }
                    let mut part = self.encode_run(&split_large(number));
                    part.push(LARGE_NUMBER_SUFFIX);
                    push_part(&mut out, &part);
                }
            }
        }
        if !run.is_empty() {
            push_part(&mut out, &self.encode_run(&run));
        }
        out
    }

    /// Decodes a hash produced by [`Hashids::encode`] with the same settings.
    ///
    /// # Errors
    ///
    /// Returns [`HashidsError::InvalidHash`] if `hash` was not produced by
    /// this encoder.
    pub fn decode(&self, hash: &str) -> Result<Vec<i64>, HashidsError> {
        let mut numbers = Vec::new();
        if hash.is_empty() {
            return Ok(numbers);
        }

        for part in hash.split(NUMBER_SEPARATOR) {
            match part.strip_suffix(LARGE_NUMBER_SUFFIX) {
                Some(limbs) => numbers.push(join_large(&self.decode_run(limbs)?)?),
                None => {
                    for value in self.decode_run(part)? {
                        let value =
                            i64::try_from(value).map_err(|_| HashidsError::InvalidHash)?;
                        numbers.push(value);
                    }
                }
            }
        }

        // Only canonical encodings are accepted.
        if self.encode(&numbers) != hash {
            return Err(HashidsError::InvalidHash);
        }
        Ok(numbers)
    }

    /// Encodes a hexadecimal string (either case).
    ///
    /// # Errors
    ///
    /// Returns [`HashidsError::InvalidHex`] if `hex` is empty or contains a
    /// non hexadecimal character.
    pub fn encode_hex(&self, hex: &str) -> Result<String, HashidsError> {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HashidsError::InvalidHex);
        }

        let numbers = hex
            .as_bytes()
            .chunks(HEX_CHUNK_LEN)
            .map(|chunk| {
                // A leading 1 keeps the chunk's leading zeros.
                chunk.iter().try_fold(1_i64, |acc, &b| {
                    let digit = char::from(b).to_digit(16).ok_or(HashidsError::InvalidHex)?;
                    Ok::<_, HashidsError>(acc * 16 + i64::from(digit))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.encode(&numbers))
    }

    /// Decodes a hash produced by [`Hashids::encode_hex`] back into lower case
    /// hexadecimal.
    ///
    /// # Errors
    ///
    /// Returns [`HashidsError::InvalidHash`] if `hash` was not produced by
    /// [`Hashids::encode_hex`] with this encoder.
    pub fn decode_hex(&self, hash: &str) -> Result<String, HashidsError> {
        let numbers = self.decode(hash)?;
        if numbers.is_empty() {
            return Err(HashidsError::InvalidHash);
        }

        let mut hex = String::new();
        for number in numbers {
            let chunk = format!("{number:x}");
            match chunk.strip_prefix('1') {
                Some(digits) if number > 0 && digits.len() <= HEX_CHUNK_LEN => {
                    hex.push_str(digits);
                }
                _ => return Err(HashidsError::InvalidHash),
            }
        }
        Ok(hex)
    }

    /// Encodes the raw value of a [`SnowflakeId`].
    ///
    /// The 64 raw bits are encoded as one signed value, so an ID with the
    /// reserved bit set still round-trips.
    pub fn encode_id(&self, id: SnowflakeId) -> String {
        self.encode(&[id.to_raw() as i64])
    }

    /// Decodes a hash produced by [`Hashids::encode_id`].
    ///
    /// # Errors
    ///
    /// Returns [`HashidsError::InvalidHash`] if `hash` does not decode to
    /// exactly one value.
    pub fn decode_id(&self, hash: &str) -> Result<SnowflakeId, HashidsError> {
        match self.decode(hash)?.as_slice() {
            &[raw] => Ok(SnowflakeId::from_raw(raw as u64)),
            _ => Err(HashidsError::InvalidHash),
        }
    }

    /// Alphabet used for the next number: `alphabet` shuffled by the lottery
    /// character, the salt and `alphabet` itself.
    fn next_alphabet(&self, lottery: char, alphabet: &[char]) -> Vec<char> {
        let key: Vec<char> = iter::once(lottery)
            .chain(self.salt.iter().copied())
            .chain(alphabet.iter().copied())
            .take(alphabet.len())
            .collect();
        let mut next = alphabet.to_vec();
        consistent_shuffle(&mut next, &key);
        next
    }

    /// Encodes a run of values in `0..=HASHIDS_MAX_NUMBER`.
    fn encode_run(&self, numbers: &[u64]) -> String {
        let numbers_hash: usize = numbers
            .iter()
            .zip(100_u64..)
            .map(|(&n, modulus)| (n % modulus) as usize)
            .sum();

        let lottery = self.alphabet[numbers_hash % self.alphabet.len()];
        let mut out = vec![lottery];
        let mut alphabet = self.alphabet.clone();

        for (i, &number) in numbers.iter().enumerate() {
            alphabet = self.next_alphabet(lottery, &alphabet);
            let start = out.len();
            hash(number, &alphabet, &mut out);

            if i + 1 < numbers.len() {
                let index = match out.get(start) {
                    Some(&first) => {
                        let modulus = u64::from(first) + i as u64;
                        (number % modulus) as usize % self.separators.len()
                    }
                    None => 0,
                };
                out.push(self.separators[index]);
            }
        }

        if out.len() < self.min_length {
            let guard = self.guard(numbers_hash, out[0]);
            out.insert(0, guard);
            if out.len() < self.min_length {
                let guard = self.guard(numbers_hash, out[2.min(out.len() - 1)]);
                out.push(guard);
            }
        }

        let half = self.alphabet.len() / 2;
        while out.len() < self.min_length {
            let key = alphabet.clone();
            consistent_shuffle(&mut alphabet, &key);

            let mut padded = Vec::with_capacity(out.len() + alphabet.len());
            padded.extend_from_slice(&alphabet[half..]);
            padded.extend_from_slice(&out);
            padded.extend_from_slice(&alphabet[..half]);

            let excess = padded.len().saturating_sub(self.min_length);
            if excess > 0 {
                let start = excess / 2;
                padded = padded[start..start + self.min_length].to_vec();
            }
            out = padded;
        }

        out.into_iter().collect()
    }

    fn guard(&self, numbers_hash: usize, ch: char) -> char {
        self.guards[(numbers_hash + u32::from(ch) as usize) % self.guards.len()]
    }

    /// Inverse of [`Hashids::encode_run`], without the canonical check.
    fn decode_run(&self, part: &str) -> Result<Vec<u64>, HashidsError> {
        if part.is_empty() {
            return Ok(Vec::new());
        }

        let chars: Vec<char> = part.chars().collect();
        let segments: Vec<&[char]> = chars.split(|ch| self.guards.contains(ch)).collect();
        let body = match segments.len() {
            2 | 3 => segments[1],
            _ => segments[0],
        };
        let (&lottery, rest) = body.split_first().ok_or(HashidsError::InvalidHash)?;

        let mut alphabet = self.alphabet.clone();
        rest.split(|ch| self.separators.contains(ch))
            .map(|sub| {
                alphabet = self.next_alphabet(lottery, &alphabet);
                unhash(sub, &alphabet)
            })
            .collect()
    }
}

impl Default for Hashids {
    fn default() -> Self {
        Self::new("")
    }
}

fn push_part(out: &mut String, part: &str) {
    if !out.is_empty() {
        out.push(NUMBER_SEPARATOR);
    }
    out.push_str(part);
}

/// Appends `number` in base `alphabet.len()`, most significant digit first.
/// Zero appends nothing.
fn hash(mut number: u64, alphabet: &[char], out: &mut Vec<char>) {
    let start = out.len();
    let base = alphabet.len() as u64;
    while number > 0 {
        out.push(alphabet[(number % base) as usize]);
        number /= base;
    }
    out[start..].reverse();
}

fn unhash(input: &[char], alphabet: &[char]) -> Result<u64, HashidsError> {
    let base = alphabet.len() as u64;
    input.iter().try_fold(0_u64, |acc, ch| {
        let digit = alphabet
            .iter()
            .position(|c| c == ch)
            .ok_or(HashidsError::InvalidHash)?;
        acc.checked_mul(base)
            .and_then(|acc| acc.checked_add(digit as u64))
            .ok_or(HashidsError::InvalidHash)
    })
}

/// Splits a value outside `0..=HASHIDS_MAX_NUMBER` into limbs: `[rem, quot]`
/// for positive values and `[-rem, 0, -quot]` for negative ones.
fn split_large(number: i64) -> Vec<u64> {
    let quotient = number / HASHIDS_MAX_NUMBER;
    let remainder = number % HASHIDS_MAX_NUMBER;
    if number > 0 {
        vec![remainder.unsigned_abs(), quotient.unsigned_abs()]
    } else {
        vec![remainder.unsigned_abs(), 0, quotient.unsigned_abs()]
    }
}

fn join_large(limbs: &[u64]) -> Result<i64, HashidsError> {
    let limb = |value: u64| i64::try_from(value).map_err(|_| HashidsError::InvalidHash);
    let joined = match *limbs {
        [value] => Some(limb(value)?),
        [remainder, quotient] => limb(quotient)?
            .checked_mul(HASHIDS_MAX_NUMBER)
            .and_then(|v| v.checked_add(limb(remainder).ok()?)),
        [remainder, 0, quotient] => limb(quotient)?
            .checked_neg()
            .and_then(|q| q.checked_mul(HASHIDS_MAX_NUMBER))
            .and_then(|v| v.checked_sub(limb(remainder).ok()?)),
        _ => None,
    };
    joined.ok_or(HashidsError::InvalidHash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn korea() -> Hashids {
        Hashids::new("great korea")
    }

    #[test]
    fn encodes_single_numbers() {
        let hashids = korea();
        assert_eq!(hashids.encode(&[1]), "Vp");
        assert_eq!(hashids.encode(&[2]), "n9");
        assert_eq!(hashids.encode(&[3]), "GJ");
        assert_eq!(hashids.encode(&[4]), "OR");
        assert_eq!(hashids.encode(&[5]), "wo");
        assert_eq!(hashids.encode(&[9_876_543_210_123]), "5rdJmxRkk");
        assert_eq!(hashids.encode(&[i64::from(i32::MAX)]), "G8xee2O");
    }

    #[test]
    fn encodes_zero_as_lottery_only() {
        let hashids = korea();
        assert_eq!(hashids.encode(&[0]), "Y");
        assert_eq!(hashids.decode("Y").unwrap(), vec![0]);

        assert_eq!(hashids.encode(&[1, 2, 0, 3]), "aoHafsB");
        assert_eq!(hashids.decode("aoHafsB").unwrap(), vec![1, 2, 0, 3]);
    }

    #[test]
    fn encodes_number_lists() {
        let hashids = korea();
        assert_eq!(hashids.encode(&[5, 5, 5, 5]), "EWh0hghy");
        assert_eq!(hashids.decode("EWh0hghy").unwrap(), vec![5, 5, 5, 5]);

        let numbers: Vec<i64> = (1..=10).collect();
        assert_eq!(hashids.encode(&numbers), "pGHrfQT5CrhZInuecOUj");
        assert_eq!(hashids.decode("pGHrfQT5CrhZInuecOUj").unwrap(), numbers);
    }

    #[test]
    fn decodes_boundary_values() {
        let hashids = korea();
        for number in [0, 1, 1014, HASHIDS_MAX_NUMBER] {
            let hash = hashids.encode(&[number]);
            assert!(!hash.ends_with(LARGE_NUMBER_SUFFIX), "{hash}");
            assert_eq!(hashids.decode(&hash).unwrap(), vec![number]);
        }
    }

    #[test]
    fn encodes_large_and_negative_numbers() {
        let hashids = korea();
        assert_eq!(hashids.encode(&[1, 2]), "GjHB");
        assert_eq!(hashids.encode(&[-3]), "GJTs=");
        assert_eq!(hashids.encode(&[1, 2, -3]), "GjHB-GJTs=");
        assert_eq!(hashids.decode("GjHB-GJTs=").unwrap(), vec![1, 2, -3]);

        let numbers = [
            HASHIDS_MAX_NUMBER + 3,
            HASHIDS_MAX_NUMBER + 1004,
            -(HASHIDS_MAX_NUMBER + 100),
            i64::MAX,
            i64::MIN,
            -1,
        ];
        for number in numbers {
            let hash = hashids.encode(&[number]);
            assert!(hash.ends_with(LARGE_NUMBER_SUFFIX), "{hash}");
            assert_eq!(hashids.decode(&hash).unwrap(), vec![number]);
        }
        let hash = hashids.encode(&numbers);
        assert_eq!(hashids.decode(&hash).unwrap(), numbers);
    }

    #[test]
    fn mixed_runs_round_trip() {
        let hashids = korea();
        let numbers = [7, 8, -9, 10, HASHIDS_MAX_NUMBER + 1, 0, 11];
        let hash = hashids.encode(&numbers);
        assert_eq!(hash.matches(NUMBER_SEPARATOR).count(), 4);
        assert_eq!(hashids.decode(&hash).unwrap(), numbers);
    }

    #[test]
    fn custom_alphabet() {
        let hashids = Hashids::with_alphabet("this is my salt", 0, "01223456789abcdef").unwrap();
        assert_eq!(hashids.encode(&[1_234_567]), "b332db5");
        assert_eq!(hashids.decode("b332db5").unwrap(), vec![1_234_567]);

        assert_eq!(
            Hashids::with_alphabet("salt", 0, "0123456789"),
            Err(HashidsError::AlphabetTooShort { len: 10, min: 16 })
        );
    }

    #[test]
    fn pads_to_min_length() {
        let hashids = Hashids::with_min_length("this is my salt", 8);
        assert_eq!(hashids.encode(&[1]), "gB0NV05e");
        assert_eq!(hashids.decode("gB0NV05e").unwrap(), vec![1]);

        let hashids = Hashids::with_min_length("this is my salt", 20);
        for numbers in [&[0][..], &[1, 2, 3]] {
            let hash = hashids.encode(numbers);
            assert_eq!(hash.len(), 20, "{hash}");
            assert_eq!(hashids.decode(&hash).unwrap(), numbers);
        }

        // The suffix is added after padding.
        let hash = hashids.encode(&[HASHIDS_MAX_NUMBER + 7]);
        assert_eq!(hash.len(), 21, "{hash}");
        assert_eq!(hashids.decode(&hash).unwrap(), vec![HASHIDS_MAX_NUMBER + 7]);
    }

    #[test]
    fn rejects_foreign_hashes() {
        let hashids = Hashids::new("this is my pepper");
        assert_eq!(hashids.decode("NkK9"), Err(HashidsError::InvalidHash));
        assert_eq!(hashids.decode("*&^"), Err(HashidsError::InvalidHash));

        // Valid pieces joined in a non canonical way.
        let korea = korea();
        let split = format!("{}-{}", korea.encode(&[1]), korea.encode(&[2]));
        assert_eq!(korea.decode(&split), Err(HashidsError::InvalidHash));
    }

    #[test]
    fn empty_input() {
        let hashids = korea();
        assert_eq!(hashids.encode(&[]), "");
        assert_eq!(hashids.decode("").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn hex_round_trip() {
        let hashids = korea();
        for hex in ["0", "deadbeef", "00ff00ff00ff00ff00ff", "ABCDEF0123456789abcdef"] {
            let hash = hashids.encode_hex(hex).unwrap();
            assert_eq!(hashids.decode_hex(&hash).unwrap(), hex.to_ascii_lowercase());
        }
        assert_eq!(hashids.encode_hex(""), Err(HashidsError::InvalidHex));
        assert_eq!(hashids.encode_hex("xyz"), Err(HashidsError::InvalidHex));
        assert_eq!(
            hashids.decode_hex(&hashids.encode(&[3])),
            Err(HashidsError::InvalidHash)
        );
    }

    #[test]
    fn snowflake_id_round_trip() {
        let hashids = korea();
        let id = SnowflakeId::from_components(crate::MAX_TIMESTAMP, 1023, 4095);
        let hash = hashids.encode_id(id);
        assert_eq!(hashids.decode_id(&hash).unwrap(), id);

        let small = SnowflakeId::from_components(1, 2, 3);
        assert_eq!(hashids.decode_id(&hashids.encode_id(small)).unwrap(), small);

        let reserved = SnowflakeId::from_raw(u64::MAX);
        assert_eq!(hashids.decode_id(&hashids.encode_id(reserved)).unwrap(), reserved);
        assert_eq!(
            hashids.decode_id(&hashids.encode(&[1, 2])),
            Err(HashidsError::InvalidHash)
        );
    }
}
