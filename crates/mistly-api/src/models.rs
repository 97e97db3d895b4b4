// Mist API response types
//
// Models for the three org-scoped listings the report consumes. Fields use
// `Option` + `#[serde(default)]` liberally: the search endpoints omit keys
// freely and sometimes send explicit nulls. Only fields the report reads
// are typed; everything else lands in `extra` untyped, so an odd value in
// an unused field never costs a record.

use serde::{Deserialize, Serialize};

// ── Sites ────────────────────────────────────────────────────────────

/// Site entry from `GET /api/v1/orgs/{org_id}/sites`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSite {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── User MACs ────────────────────────────────────────────────────────

/// Inventory entry from `GET /api/v1/orgs/{org_id}/usermacs/search`.
///
/// One per device the organization knows about, regardless of whether it
/// has ever authenticated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMac {
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── NAC clients ──────────────────────────────────────────────────────

/// Authentication event from `GET /api/v1/orgs/{org_id}/nac_clients/search`.
///
/// The same MAC usually appears many times across a lookback window; the
/// report keeps only the most recent entry per device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NacClient {
    #[serde(default)]
    pub mac: Option<String>,
    /// Epoch seconds. Sometimes fractional.
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub last_nacrule_name: Option<String>,
    /// `wired` or `wireless` in practice.
    #[serde(default, rename = "type")]
    pub client_type: Option<String>,
    #[serde(default)]
    pub last_ssid: Option<String>,
    #[serde(default)]
    pub last_port_id: Option<String>,
    #[serde(default)]
    pub auth_type: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
