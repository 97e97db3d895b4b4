// ── Domain model ──
//
// Canonical types the join and renderers operate on. API wire types never
// leak past `convert.rs`.

pub mod mac;
pub mod record;
pub mod site;
pub mod time;

pub use mac::{InvalidMac, MacAddress, normalize_mac};
pub use record::{ActivityRecord, ConnectionType, IdentityRecord, title_case};
pub use site::SiteLookup;
pub use time::{
    INVALID_DATE, LAST_SEEN_FORMAT, NEVER, format_timestamp, format_timestamp_in, parse_last_seen,
};
