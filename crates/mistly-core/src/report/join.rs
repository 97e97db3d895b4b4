// ── Endpoint join ──
//
// One row per inventory device, enriched with that device's most recent
// NAC event. The MAC → latest-activity map is computed up front and each
// row is built from it in a single pass; input order is preserved.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{
    ActivityRecord, IdentityRecord, MacAddress, NEVER, SiteLookup, format_timestamp,
};

/// Column headers, in the order every tabular format emits them.
pub const COLUMNS: [&str; 10] = [
    "Name",
    "MAC Address",
    "Labels",
    "Description",
    "Last Seen",
    "Site",
    "Connection Type",
    "SSID/Port",
    "Auth Type",
    "Matched Auth Policy Rule",
];

/// Placeholder for fields no activity record filled in.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Placeholder for site and connection type on unmatched rows.
pub const UNKNOWN: &str = "Unknown";

/// Rule shown when a device authenticated without matching a named rule.
pub const NO_RULE_MATCHED: &str = "No Rule Matched";

// ── Row ─────────────────────────────────────────────────────────────

/// One report row. Serialized field names are the column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MAC Address")]
    pub mac: String,
    #[serde(rename = "Labels")]
    pub labels: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Last Seen")]
    pub last_seen: String,
    #[serde(rename = "Site")]
    pub site_name: String,
    #[serde(rename = "Connection Type")]
    pub connection_type: String,
    #[serde(rename = "SSID/Port")]
    pub ssid_or_port: String,
    #[serde(rename = "Auth Type")]
    pub auth_type: String,
    #[serde(rename = "Matched Auth Policy Rule")]
    pub matched_rule: String,
}

impl EndpointRow {
    /// Row for a device with no NAC activity.
    fn unmatched(identity: &IdentityRecord, mac: &MacAddress) -> Self {
        Self {
            name: identity.name.clone(),
            mac: mac.to_string(),
            labels: identity.labels.join(", "),
            description: identity.notes.clone(),
            last_seen: NEVER.to_owned(),
            site_name: UNKNOWN.to_owned(),
            connection_type: UNKNOWN.to_owned(),
            ssid_or_port: NOT_AVAILABLE.to_owned(),
            auth_type: NOT_AVAILABLE.to_owned(),
            matched_rule: NOT_AVAILABLE.to_owned(),
        }
    }

    /// Overlay the winning activity record.
    fn matched(self, activity: &ActivityRecord, sites: &SiteLookup) -> Self {
        Self {
            last_seen: format_timestamp(activity.timestamp),
            connection_type: activity.connection_type.title(),
            auth_type: if activity.auth_type.is_empty() {
                UNKNOWN.to_owned()
            } else {
                activity.auth_type.to_uppercase()
            },
            matched_rule: if activity.matched_rule_name.is_empty() {
                NO_RULE_MATCHED.to_owned()
            } else {
                activity.matched_rule_name.clone()
            },
            site_name: sites.display_name(&activity.site_id),
            ssid_or_port: activity
                .location_label()
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            ..self
        }
    }

    /// Field values in [`COLUMNS`] order.
    pub fn values(&self) -> [&str; 10] {
        [
            self.name.as_str(),
            self.mac.as_str(),
            self.labels.as_str(),
            self.description.as_str(),
            self.last_seen.as_str(),
            self.site_name.as_str(),
            self.connection_type.as_str(),
            self.ssid_or_port.as_str(),
            self.auth_type.as_str(),
            self.matched_rule.as_str(),
        ]
    }
}

// ── Latest activity ─────────────────────────────────────────────────

/// Most recent activity record per normalized MAC.
///
/// The first record seen for a MAC wins by default; a later one replaces
/// it only when its timestamp is present, non-zero and strictly greater
/// than the current winner's.
pub fn latest_activity(activities: &[ActivityRecord]) -> HashMap<MacAddress, &ActivityRecord> {
    let mut latest: HashMap<MacAddress, &ActivityRecord> = HashMap::new();
    for activity in activities {
        let Some(mac) = MacAddress::normalize(&activity.mac) else {
            debug!(mac = %activity.mac, "dropping activity with invalid MAC");
            continue;
        };
        match latest.get(&mac) {
            None => {
                latest.insert(mac, activity);
            }
            Some(current) => {
                let newer = activity
                    .effective_timestamp()
                    .is_some_and(|ts| current.timestamp.is_none_or(|cur| ts > cur));
                if newer {
                    latest.insert(mac, activity);
                }
            }
        }
    }
    latest
}

// ── Report ──────────────────────────────────────────────────────────

/// Joined table plus join counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub rows: Vec<EndpointRow>,
    /// Rows that found a NAC record.
    pub matched: usize,
    /// Distinct valid MACs in the NAC data.
    pub activity_macs: usize,
    /// Inventory entries dropped for an invalid MAC.
    pub dropped: usize,
}

/// Join inventory against NAC activity.
///
/// Output follows `identities` order. Identities with an invalid MAC are
/// dropped; duplicate MACs produce duplicate rows.
pub fn build_report(
    identities: &[IdentityRecord],
    activities: &[ActivityRecord],
    sites: &SiteLookup,
) -> Report {
    info!(
        identities = identities.len(),
        activities = activities.len(),
        "building endpoint report"
    );

    let latest = latest_activity(activities);
    let mut matched = 0;
    let mut dropped = 0;

    let rows: Vec<EndpointRow> = identities
        .iter()
        .filter_map(|identity| {
            let Some(mac) = MacAddress::normalize(&identity.mac) else {
                debug!(mac = %identity.mac, "dropping device with invalid MAC");
                dropped += 1;
                return None;
            };
            let row = EndpointRow::unmatched(identity, &mac);
            Some(match latest.get(&mac) {
                Some(activity) => {
                    matched += 1;
                    row.matched(activity, sites)
                }
                None => row,
            })
        })
        .collect();

    info!(
        rows = rows.len(),
        matched,
        activity_macs = latest.len(),
        dropped,
        "endpoint report built"
    );

    Report {
        rows,
        matched,
        activity_macs: latest.len(),
        dropped,
    }
}
