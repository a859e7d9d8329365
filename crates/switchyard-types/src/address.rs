//! Bus addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Logical endpoint name on the message bus (e.g. `"event.verticle"`).
///
/// Always non-empty. Used as the sole key into the address registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Build an address, rejecting empty or whitespace-only names.
    pub fn new(name: impl Into<String>) -> Result<Self, AddressError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AddressError::Empty);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_address() {
        let address: Address = "event.verticle".parse().unwrap();
        assert_eq!(address.as_str(), "event.verticle");
        assert_eq!(address.to_string(), "event.verticle");
    }

    #[test]
    fn test_empty_address_rejected() {
        assert_eq!(Address::new(""), Err(AddressError::Empty));
        assert_eq!(Address::new("   "), Err(AddressError::Empty));
    }

    #[test]
    fn test_address_serde_validates() {
        let parsed: Address = serde_json::from_str("\"orders\"").unwrap();
        assert_eq!(parsed.as_str(), "orders");
        assert!(serde_json::from_str::<Address>("\"\"").is_err());
    }
}
