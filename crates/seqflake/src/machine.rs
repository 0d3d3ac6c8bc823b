use std::{
    env, fs,
    hash::{DefaultHasher, Hash, Hasher},
};

use crate::id::MAX_MACHINE_ID;

/// Environment variable consulted first by [`machine_id_from_env`].
pub const MACHINE_ID_ENV: &str = "SEQFLAKE_MACHINE_ID";

/// Folds an arbitrary integer into the machine ID range
/// `[0, MAX_MACHINE_ID)` by absolute value modulo.
///
/// ```
/// use seqflake::{normalize_machine_id, MAX_MACHINE_ID};
///
/// assert_eq!(normalize_machine_id(5), 5);
/// assert_eq!(normalize_machine_id(-5), 5);
/// assert_eq!(normalize_machine_id(i64::from(MAX_MACHINE_ID) + 3), 3);
/// ```
pub fn normalize_machine_id(raw: i64) -> u16 {
    // `unsigned_abs` keeps `i64::MIN` in range.
    (raw.unsigned_abs() % u64::from(MAX_MACHINE_ID)) as u16
}

/// Derives a machine ID for this process from its environment.
///
/// Resolution order:
/// 1. the integer in [`MACHINE_ID_ENV`],
/// 2. a hash of the host name (`HOSTNAME`, `COMPUTERNAME`, `/etc/hostname`),
/// 3. the process id.
///
/// The result is always normalized with [`normalize_machine_id`]. Hosts that
/// share a name hash to the same ID; set the variable explicitly when
/// several producers run side by side.
pub fn machine_id_from_env() -> u16 {
    if let Some(raw) = env::var(MACHINE_ID_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
    {
        return normalize_machine_id(raw);
    }

    match hostname() {
        Some(name) => {
            let mut hasher = DefaultHasher::new();
            name.hash(&mut hasher);
            normalize_machine_id(hasher.finish() as i64)
        }
        None => normalize_machine_id(i64::from(std::process::id())),
    }
}

fn hostname() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .chain(fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_owned())
        .find(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_into_range() {
        assert_eq!(normalize_machine_id(0), 0);
        assert_eq!(normalize_machine_id(1023), 1023);
        assert_eq!(normalize_machine_id(1024), 0);
        assert_eq!(normalize_machine_id(-1025), 1);
        assert!(normalize_machine_id(i64::MIN) < MAX_MACHINE_ID);
        assert!(normalize_machine_id(i64::MAX) < MAX_MACHINE_ID);
    }

    #[test]
    fn env_derived_id_is_in_range() {
        assert!(machine_id_from_env() < MAX_MACHINE_ID);
    }
}
