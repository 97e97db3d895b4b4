// ── MAC address normalization ──
//
// Mist reports the same device MAC in several spellings depending on the
// endpoint (`aa:bb:..`, `AA-BB-..`, `aabb.ccdd.eeff`, bare hex). Joins key
// on the canonical 12-digit uppercase form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of hex digits in a canonical MAC.
const MAC_DIGITS: usize = 12;

/// MAC address in canonical form: 12 uppercase hex digits, no separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Canonicalize any common spelling. Returns `None` unless the result is
    /// exactly 12 hex digits.
    pub fn normalize(raw: &str) -> Option<Self> {
        let canonical: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | '.'))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let valid = canonical.len() == MAC_DIGITS
            && canonical
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));
        valid.then_some(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// String form of [`MacAddress::normalize`]: the canonical MAC, or `""`
/// when the input is not a MAC.
pub fn normalize_mac(raw: &str) -> String {
    MacAddress::normalize(raw)
        .map(String::from)
        .unwrap_or_default()
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a string is not a MAC address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a MAC address: {0:?}")]
pub struct InvalidMac(pub String);

impl FromStr for MacAddress {
    type Err = InvalidMac;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or_else(|| InvalidMac(s.to_owned()))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = InvalidMac;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}
