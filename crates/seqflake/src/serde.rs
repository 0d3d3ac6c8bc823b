use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::ParseIdError, id::SnowflakeId};

impl Serialize for SnowflakeId {
    /// Serializes the ID as its raw `u64` value.
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_u64(self.to_raw())
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    /// Deserializes an ID from its raw `u64` value, rejecting values with the
    /// reserved bit set.
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(serde::de::Error::custom(ParseIdError::ReservedBitSet {
                raw,
            }));
        }
        Ok(id)
    }
}

/// `#[serde(with = "seqflake::as_radix36")]` support for storing IDs in
/// their fixed-width radix-36 text form.
///
/// ```
/// use seqflake::SnowflakeId;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Event {
///     #[serde(with = "seqflake::as_radix36")]
///     id: SnowflakeId,
/// }
///
/// let event = Event { id: SnowflakeId::from_components(1, 2, 3) };
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"id":"000000002i2o3"}"#);
/// ```
pub mod as_radix36 {
    use super::{Deserialize, Deserializer, Serializer};
    use crate::id::SnowflakeId;

    /// Serializes an ID as its radix-36 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_radix36())
    }

    /// Deserializes an ID from its radix-36 string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is empty, too long, or contains non radix-36 characters
    /// - The decoded value sets the reserved bit
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        SnowflakeId::from_radix36(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::{RADIX36_LEN, SnowflakeId};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Raw {
        id: SnowflakeId,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Text {
        #[serde(with = "crate::as_radix36")]
        id: SnowflakeId,
    }

    #[test]
    fn serializes_as_raw_integer() {
        let id = SnowflakeId::from_components(42, 1, 7);
        let json = serde_json::to_string(&Raw { id }).unwrap();
        assert_eq!(json, format!(r#"{{"id":{}}}"#, id.to_raw()));

        let back: Raw = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, id);
    }

    #[test]
    fn rejects_reserved_bit() {
        let json = format!(r#"{{"id":{}}}"#, 1_u64 << 63);
        let err = serde_json::from_str::<Raw>(&json).unwrap_err();
        assert!(err.to_string().contains("reserved bit"), "{err}");
    }

    #[test]
    fn rejects_negative_and_non_integers() {
        assert!(serde_json::from_str::<Raw>(r#"{"id":-1}"#).is_err());
        assert!(serde_json::from_str::<Raw>(r#"{"id":"12"}"#).is_err());
    }

    #[test]
    fn text_form_is_fixed_width() {
        let id = SnowflakeId::from_components(42, 1, 7);
        let value = serde_json::to_value(Text { id }).unwrap();
        let text = value["id"].as_str().unwrap();
        assert_eq!(text.len(), RADIX36_LEN);

        let back: Text = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, id);
    }

    #[test]
    fn text_form_rejects_garbage() {
        assert!(serde_json::from_str::<Text>(r#"{"id":""}"#).is_err());
        assert!(serde_json::from_str::<Text>(r#"{"id":"not-an-id"}"#).is_err());
        assert!(serde_json::from_str::<Text>(r#"{"id":"zzzzzzzzzzzzzz"}"#).is_err());
    }
}
