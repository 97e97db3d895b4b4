//! Domain logic between `mistly-api` and the CLI.
//!
//! - **Domain model** ([`model`]): canonical MAC addresses, last-seen
//!   formatting, inventory/activity records and the site lookup.
//!
//! - **[`build_report`]**: joins the device inventory against the most
//!   recent NAC event per MAC, one [`EndpointRow`] per device in input order.
//!
//! - **[`ReportStatistics`]**: activity windows, compliance and breakdowns
//!   over the joined rows.
//!
//! - **Renderers** ([`render`]): HTML, CSV, JSON and (feature `xlsx`) Excel,
//!   published to disk atomically.

pub mod convert;
pub mod error;
pub mod model;
pub mod render;
pub mod report;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use model::{
    ActivityRecord, ConnectionType, IdentityRecord, MacAddress, SiteLookup, format_timestamp,
    normalize_mac, parse_last_seen,
};
pub use render::{RenderContext, ReportFormat, Theme, Written, write_reports};
pub use report::{EndpointRow, Report, ReportStatistics, build_report};
