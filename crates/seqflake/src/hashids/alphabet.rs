use crate::error::HashidsError;

pub(crate) const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";
pub(crate) const MIN_ALPHABET_LEN: usize = 16;

const DEFAULT_SEPARATORS: &str = "cfhistuCFHISTU";
const GUARD_DIV: usize = 12;

/// Characters the encoded form uses outside of any alphabet.
pub(crate) const RESERVED: [char; 3] = [' ', super::NUMBER_SEPARATOR, super::LARGE_NUMBER_SUFFIX];

/// The three disjoint character sets derived from a salt and an alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Alphabet {
    pub(crate) alphabet: Vec<char>,
    pub(crate) separators: Vec<char>,
    pub(crate) guards: Vec<char>,
}

impl Alphabet {
    /// Checks a user supplied alphabet and returns its distinct characters
    /// in first-seen order.
    pub(crate) fn validate(alphabet: &str) -> Result<Vec<char>, HashidsError> {
        let unique = unique(alphabet);
        if let Some(&ch) = unique.iter().find(|ch| RESERVED.contains(ch)) {
            return Err(HashidsError::ReservedAlphabetChar { ch });
        }
        if unique.len() < MIN_ALPHABET_LEN {
            return Err(HashidsError::AlphabetTooShort {
                len: unique.len(),
                min: MIN_ALPHABET_LEN,
            });
        }
        Ok(unique)
    }

    /// Splits `unique` (already validated) into alphabet, separators and
    /// guards, shuffled by `salt`.
    pub(crate) fn split(unique: &[char], salt: &[char]) -> Self {
        let mut separators: Vec<char> = DEFAULT_SEPARATORS
            .chars()
            .filter(|ch| unique.contains(ch))
            .collect();
        let mut alphabet: Vec<char> = unique
            .iter()
            .copied()
            .filter(|ch| !separators.contains(ch))
            .collect();
        consistent_shuffle(&mut separators, salt);

        // Keep roughly one separator per 3.5 alphabet characters.
        if separators.is_empty() || alphabet.len() / separators.len() > 3 {
            let wanted = match (2 * alphabet.len()).div_ceil(7) {
                1 => 2,
                n => n,
            };
            if wanted > separators.len() {
                let moved = (wanted - separators.len()).min(alphabet.len());
                separators.extend(alphabet.drain(..moved));
            } else {
                separators.truncate(wanted);
            }
        }
        consistent_shuffle(&mut alphabet, salt);

        let guard_count = alphabet.len().div_ceil(GUARD_DIV);
        let guards = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Self {
            alphabet,
            separators,
            guards,
        }
    }
}

fn unique(alphabet: &str) -> Vec<char> {
    let mut seen = Vec::with_capacity(alphabet.len());
    for ch in alphabet.chars() {
        if !seen.contains(&ch) {
            seen.push(ch);
        }
    }
    seen
}

/// Deterministic in-place permutation of `alphabet` keyed by `salt`. An
/// empty salt leaves the alphabet unchanged.
pub(crate) fn consistent_shuffle(alphabet: &mut [char], salt: &[char]) {
    if salt.is_empty() {
        return;
    }
    let mut cumulative = 0usize;
    let mut v = 0usize;
    for i in (1..alphabet.len()).rev() {
        v %= salt.len();
        let code = u32::from(salt[v]) as usize;
        cumulative += code;
        let j = (code + v + cumulative) % i;
        alphabet.swap(i, j);
        v += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn shuffle_is_keyed_by_salt() {
        let mut a = chars("abcdef");
        consistent_shuffle(&mut a, &chars("salt"));
        let mut b = chars("abcdef");
        consistent_shuffle(&mut b, &chars("salt"));
        let mut c = chars("abcdef");
        consistent_shuffle(&mut c, &chars("pepper"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, chars("abcdef"));
    }

    #[test]
    fn empty_salt_keeps_order() {
        let mut a = chars("abcdef");
        consistent_shuffle(&mut a, &[]);
        assert_eq!(a, chars("abcdef"));
    }

    #[test]
    fn split_sets_are_disjoint_and_complete() {
        let unique = chars(DEFAULT_ALPHABET);
        let split = Alphabet::split(&unique, &chars("great korea"));

        assert_eq!(
            split.alphabet.len() + split.separators.len() + split.guards.len(),
            unique.len()
        );
        assert!(split.separators.iter().all(|c| !split.alphabet.contains(c)));
        assert!(split.guards.iter().all(|c| !split.alphabet.contains(c)));
        assert!(split.guards.iter().all(|c| !split.separators.contains(c)));
        assert_eq!(split.separators.len(), 14);
        assert_eq!(split.guards.len(), 4);
    }

    #[test]
    fn alphabet_without_separators_borrows_some() {
        let unique = chars("0123456789ABDEGJ");
        let split = Alphabet::split(&unique, &[]);
        assert_eq!(split.separators, chars("01234"));
        assert!(!split.guards.is_empty());
        assert!(!split.alphabet.is_empty());
    }

    #[test]
    fn validate_rejects_bad_alphabets() {
        assert_eq!(
            Alphabet::validate("abcabc"),
            Err(HashidsError::AlphabetTooShort { len: 3, min: 16 })
        );
        assert_eq!(
            Alphabet::validate("abcdefghijklmnop q"),
            Err(HashidsError::ReservedAlphabetChar { ch: ' ' })
        );
        assert_eq!(
            Alphabet::validate("abcdefghijklmnop-"),
            Err(HashidsError::ReservedAlphabetChar { ch: '-' })
        );
        assert_eq!(Alphabet::validate("01223456789abcdef").unwrap().len(), 16);
    }
}
