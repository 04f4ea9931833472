//! Account address type with `ubi_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account on the ledger, always prefixed with `ubi_`.
///
/// The "zero address" of the source design is never represented by an
/// `Address`; optional relationships use `Option<Address>` instead.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The standard prefix for all ledger addresses.
    pub const PREFIX: &'static str = "ubi_";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `ubi_` or has nothing after it.
    pub fn new(raw: impl Into<String>) -> Self {
        match Self::parse(raw) {
            Ok(address) => address,
            Err(raw) => panic!("invalid address {raw:?}: must start with ubi_"),
        }
    }

    /// Parse an address, handing the raw string back if it is malformed.
    pub fn parse(raw: impl Into<String>) -> Result<Self, String> {
        let s = raw.into();
        if s.starts_with(Self::PREFIX) && s.len() > Self::PREFIX.len() {
            Ok(Self(s))
        } else {
            Err(s)
        }
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s).map_err(|raw| format!("invalid address {raw:?}: must start with ubi_"))
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
