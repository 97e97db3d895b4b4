// ── API-to-domain type conversions ──
//
// Bridges raw `mistly_api` response types into `mistly_core::model` types.
// Missing optional fields become empty strings (or `unknown` for the
// connection type) so the join works on total data.

use mistly_api::{NacClient, RawSite, UserMac};

use crate::model::{ActivityRecord, ConnectionType, IdentityRecord, SiteLookup};

impl From<UserMac> for IdentityRecord {
    fn from(raw: UserMac) -> Self {
        Self {
            mac: raw.mac.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            labels: raw.labels.unwrap_or_default(),
            notes: raw.notes.unwrap_or_default(),
        }
    }
}

impl From<NacClient> for ActivityRecord {
    fn from(raw: NacClient) -> Self {
        let connection_type = raw
            .client_type
            .map_or_else(ConnectionType::default, ConnectionType::from);

        // The type-specific attribute only counts for its own connection type.
        let ssid = match connection_type {
            ConnectionType::Wireless => raw.last_ssid.unwrap_or_default(),
            _ => String::new(),
        };
        let port_id = match connection_type {
            ConnectionType::Wired => raw.last_port_id.unwrap_or_default(),
            _ => String::new(),
        };

        Self {
            mac: raw.mac.unwrap_or_default(),
            timestamp: raw.timestamp,
            matched_rule_name: raw.last_nacrule_name.unwrap_or_default(),
            connection_type,
            auth_type: raw.auth_type.unwrap_or_default(),
            site_id: raw.site_id.unwrap_or_default(),
            ssid,
            port_id,
        }
    }
}

impl From<&[RawSite]> for SiteLookup {
    fn from(sites: &[RawSite]) -> Self {
        let mut lookup = Self::new();
        for site in sites {
            if let Some(ref id) = site.id {
                lookup.insert(id, site.name.as_deref());
            }
        }
        lookup
    }
}
