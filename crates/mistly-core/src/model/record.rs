// ── Input records ──
//
// Domain views of the two datasets the report joins: the device inventory
// (user MACs) and the NAC authentication log. Built from API models in
// `convert.rs`; every field is already defaulted, so the join never deals
// with missing keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One device from the user MAC inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// MAC exactly as the API returned it.
    pub mac: String,
    pub name: String,
    pub labels: Vec<String>,
    pub notes: String,
}

/// How a device connected when it authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionType {
    Wired,
    Wireless,
    /// Any other value the API reports, kept verbatim.
    Other(String),
}

impl ConnectionType {
    /// Raw API spelling (`wired`, `wireless`, or the original string).
    pub fn as_raw(&self) -> &str {
        match self {
            Self::Wired => "wired",
            Self::Wireless => "wireless",
            Self::Other(raw) => raw,
        }
    }

    /// Display form: the raw value in title case (`Wireless`, `Unknown`).
    pub fn title(&self) -> String {
        title_case(self.as_raw())
    }
}

impl Default for ConnectionType {
    fn default() -> Self {
        Self::Other("unknown".to_owned())
    }
}

impl From<String> for ConnectionType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "wired" => Self::Wired,
            "wireless" => Self::Wireless,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for ConnectionType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<ConnectionType> for String {
    fn from(kind: ConnectionType) -> Self {
        match kind {
            ConnectionType::Other(raw) => raw,
            known => known.as_raw().to_owned(),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_raw())
    }
}

/// One NAC authentication event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub mac: String,
    /// Epoch seconds; `None` when the event carried no timestamp.
    pub timestamp: Option<f64>,
    pub matched_rule_name: String,
    pub connection_type: ConnectionType,
    pub auth_type: String,
    pub site_id: String,
    /// SSID for wireless events, empty otherwise.
    pub ssid: String,
    /// Switch port for wired events, empty otherwise.
    pub port_id: String,
}

impl ActivityRecord {
    /// Timestamp if present and non-zero.
    pub fn effective_timestamp(&self) -> Option<f64> {
        self.timestamp.filter(|ts| *ts != 0.0)
    }

    /// `SSID: x` / `Port: x`, or `None` when the type-specific attribute is empty.
    pub fn location_label(&self) -> Option<String> {
        match self.connection_type {
            ConnectionType::Wireless if !self.ssid.is_empty() => {
                Some(format!("SSID: {}", self.ssid))
            }
            ConnectionType::Wired if !self.port_id.is_empty() => {
                Some(format!("Port: {}", self.port_id))
            }
            _ => None,
        }
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
