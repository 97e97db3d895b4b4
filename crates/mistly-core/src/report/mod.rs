// ── Report assembly ──
//
// Join (`join`) then aggregate (`stats`). Both are pure; IO lives in
// `render`.

pub mod join;
pub mod stats;

pub use join::{
    COLUMNS, EndpointRow, NO_RULE_MATCHED, NOT_AVAILABLE, Report, UNKNOWN, build_report,
    latest_activity,
};
pub use stats::{Breakdown, ReportStatistics};
