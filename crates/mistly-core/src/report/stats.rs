// ── Report statistics ──

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::join::{EndpointRow, NOT_AVAILABLE, UNKNOWN};
use crate::model::{NEVER, parse_last_seen};

/// Value → count, most frequent first; ties keep first-appearance order.
pub type Breakdown = IndexMap<String, usize>;

/// Aggregates over the joined rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub total_devices: usize,
    pub active_last_24h: usize,
    pub active_last_7d: usize,
    pub never_seen: usize,
    pub by_auth_type: Breakdown,
    pub by_site: Breakdown,
    pub by_connection_type: Breakdown,
    /// Rows whose rule column is anything but `Not Available`.
    pub with_auth_rules: usize,
    /// `with_auth_rules / total_devices × 100`, or 0 for an empty report.
    pub compliance_rate: f64,
}

impl ReportStatistics {
    /// Compute statistics as of `now` (naive local time, matching the
    /// `Last Seen` column).
    pub fn compute(rows: &[EndpointRow], now: NaiveDateTime) -> Self {
        let cutoff_24h = now - Duration::hours(24);
        let cutoff_7d = now - Duration::days(7);

        let mut stats = Self {
            total_devices: rows.len(),
            ..Self::default()
        };

        for row in rows {
            if let Some(seen) = parse_last_seen(&row.last_seen) {
                if seen >= cutoff_24h {
                    stats.active_last_24h += 1;
                }
                if seen >= cutoff_7d {
                    stats.active_last_7d += 1;
                }
            }
            if row.last_seen == NEVER {
                stats.never_seen += 1;
            }
            if row.matched_rule != NOT_AVAILABLE {
                stats.with_auth_rules += 1;
            }
            tally(&mut stats.by_auth_type, &row.auth_type);
            tally(&mut stats.by_site, &row.site_name);
            tally(&mut stats.by_connection_type, &row.connection_type);
        }

        for breakdown in [
            &mut stats.by_auth_type,
            &mut stats.by_site,
            &mut stats.by_connection_type,
        ] {
            breakdown.sort_by(|_, a, _, b| b.cmp(a));
        }

        stats.compliance_rate = percent(stats.with_auth_rules, stats.total_devices);
        stats
    }

    /// Share of devices seen in the last 7 days, in percent.
    pub fn activity_rate(&self) -> f64 {
        percent(self.active_last_7d, self.total_devices)
    }

    /// The `n` sites with the most devices.
    pub fn top_sites(&self, n: usize) -> Vec<(&str, usize)> {
        self.by_site
            .iter()
            .take(n)
            .map(|(site, count)| (site.as_str(), *count))
            .collect()
    }

    /// Devices whose connection type displays as `label` (e.g. `Wireless`).
    pub fn connection_count(&self, label: &str) -> usize {
        self.by_connection_type.get(label).copied().unwrap_or(0)
    }
}

fn tally(breakdown: &mut Breakdown, value: &str) {
    let key = if value.is_empty() { UNKNOWN } else { value };
    *breakdown.entry(key.to_owned()).or_insert(0) += 1;
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
