use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A six-digit Indian postal code. The first digit is never `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pincode(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPincode(pub String);

impl fmt::Display for InvalidPincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid pincode", self.0)
    }
}

impl std::error::Error for InvalidPincode {}

impl Pincode {
    /// Trims surrounding whitespace and validates.
    ///
    /// # Errors
    /// [`InvalidPincode`] unless the input is exactly six ASCII digits not starting with `0`.
    pub fn parse(raw: &str) -> Result<Self, InvalidPincode> {
        let code = raw.trim();
        let bytes = code.as_bytes();
        let valid = bytes.len() == 6 && bytes.iter().all(u8::is_ascii_digit) && bytes[0] != b'0';
        if valid { Ok(Self(code.to_owned())) } else { Err(InvalidPincode(raw.to_owned())) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Pincode {
    type Err = InvalidPincode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Pincode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Pincode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
