use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Customer contact data (phone numbers, delivery addresses) that must never
/// show up verbatim in `Debug` output, and therefore never in `tracing` fields.
///
/// Serialization is transparent: API responses and database rows carry the
/// real value.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Masked<T>(pub T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn as_inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Masked<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Masked)
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let phone = Masked::new("0901234567".to_string());
        assert_eq!(format!("{:?}", phone), "********");
        assert_eq!(phone.to_string(), "********");
    }

    #[test]
    fn test_serde_is_transparent() {
        let phone = Masked::new("0901234567".to_string());
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"0901234567\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_inner(), "0901234567");
    }
}
