// Page-based pagination over Mist search/list endpoints.
//
// Mist listings answer in several shapes (bare array, `results` envelope,
// `data` envelope, or a single object) and may repeat records across
// pages. `PageCollector` normalizes each page and decides when to stop;
// the HTTP loop itself lives in `client.rs`.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::Error;

/// Records requested per page.
pub const PAGE_LIMIT: usize = 1000;

/// Hard cap on pages fetched from a single endpoint. Paging stops once
/// the page numbered past 50 has been read.
pub const MAX_PAGES: u32 = 51;

// ── Page body ────────────────────────────────────────────────────────

/// One decoded page: its records plus the total the server declared, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBody {
    pub records: Vec<Value>,
    pub total: Option<u64>,
}

impl PageBody {
    /// Normalize any of the known response shapes into a `PageBody`.
    ///
    /// - `[...]` → records, no declared total
    /// - `{"results": [...], "total"|"count": n}` → records + total
    /// - `{"data": [...], "total"|"count": n}` → records + total
    /// - any other object → a single record, total 1
    /// - anything else → empty, total 0
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Array(records) => Self {
                records,
                total: None,
            },
            Value::Object(mut map) => {
                let total = map
                    .get("total")
                    .or_else(|| map.get("count"))
                    .and_then(Value::as_u64);
                let envelope = map.remove("results").or_else(|| map.remove("data"));
                match envelope {
                    Some(Value::Array(records)) => Self { records, total },
                    Some(_) => Self {
                        records: Vec::new(),
                        total,
                    },
                    None => Self {
                        records: vec![Value::Object(map)],
                        total: Some(1),
                    },
                }
            }
            _ => Self {
                records: Vec::new(),
                total: Some(0),
            },
        }
    }
}

// ── Record identity ──────────────────────────────────────────────────

/// Identity used to deduplicate records across pages.
///
/// Prefers `id`, then `wcid`, then a synthetic `"{mac}-{timestamp}"` key
/// (with `device_mac` standing in for a missing `mac`).
pub fn record_key(record: &Value) -> String {
    fn scalar(v: &Value) -> Option<String> {
        match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    if let Some(id) = record.get("id").and_then(scalar) {
        return id;
    }
    if let Some(wcid) = record.get("wcid").and_then(scalar) {
        return wcid;
    }
    let mac = record
        .get("mac")
        .or_else(|| record.get("device_mac"))
        .and_then(scalar)
        .unwrap_or_default();
    let timestamp = record.get("timestamp").and_then(scalar).unwrap_or_default();
    format!("{mac}-{timestamp}")
}

// ── Collector ────────────────────────────────────────────────────────

/// Why pagination stopped for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The server returned no records.
    EmptyPage,
    /// Every record on the page had already been seen.
    NoNewRecords,
    /// Fewer records than the requested limit.
    ShortPage,
    /// The declared total has been collected.
    TotalReached,
    /// [`MAX_PAGES`] pages fetched.
    PageCap,
}

/// Accumulates unique records page by page.
#[derive(Debug)]
pub struct PageCollector {
    limit: usize,
    pages: u32,
    seen: HashSet<String>,
    records: Vec<Value>,
}

impl PageCollector {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            pages: 0,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Number of pages absorbed so far.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Number of unique records collected so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Absorb one page. Returns `Some(reason)` when the caller should stop.
    pub fn absorb(&mut self, page: PageBody) -> Option<StopReason> {
        self.pages += 1;
        let received = page.records.len();
        if received == 0 {
            return Some(StopReason::EmptyPage);
        }

        let before = self.records.len();
        for record in page.records {
            if self.seen.insert(record_key(&record)) {
                self.records.push(record);
            }
        }
        let fresh = self.records.len() - before;

        tracing::info!(
            page = self.pages,
            received,
            fresh,
            total_so_far = self.records.len(),
            "page retrieved"
        );

        if fresh == 0 {
            return Some(StopReason::NoNewRecords);
        }
        if received < self.limit {
            return Some(StopReason::ShortPage);
        }
        if let Some(total) = page.total {
            if total > 0 && u64::try_from(self.records.len()).unwrap_or(u64::MAX) >= total {
                return Some(StopReason::TotalReached);
            }
        }
        if self.pages >= MAX_PAGES {
            tracing::warn!(pages = self.pages, "page cap reached, stopping early");
            return Some(StopReason::PageCap);
        }
        None
    }

    /// Consume the collector, returning the unique records in arrival order.
    pub fn into_records(self) -> Vec<Value> {
        self.records
    }
}

// ── Fetch result ─────────────────────────────────────────────────────

/// Everything retrieved from one endpoint.
///
/// Transport failures do not discard what was already collected: `records`
/// holds every record decoded before the failure and `aborted` carries the
/// error that ended pagination early.
#[derive(Debug)]
pub struct Fetched<T> {
    pub records: Vec<T>,
    pub pages: u32,
    /// Records that arrived but did not decode into `T`.
    pub skipped: usize,
    pub stop: Option<StopReason>,
    pub aborted: Option<Error>,
}

impl<T> Fetched<T> {
    /// True when pagination ended because of an error.
    pub fn is_partial(&self) -> bool {
        self.aborted.is_some()
    }

    /// Return the records, or the error if nothing at all was retrieved.
    pub fn into_result(self) -> Result<Vec<T>, Error> {
        match self.aborted {
            Some(err) if self.records.is_empty() => Err(err),
            _ => Ok(self.records),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(records: Vec<Value>, total: Option<u64>) -> PageBody {
        PageBody { records, total }
    }

    #[test]
    fn parses_bare_list() {
        let body = PageBody::from_json(json!([{ "id": "a" }, { "id": "b" }]));
        assert_eq!(body.records.len(), 2);
        assert_eq!(body.total, None);
    }

    #[test]
    fn parses_results_envelope_with_total() {
        let body = PageBody::from_json(json!({ "results": [{ "id": "a" }], "total": 7 }));
        assert_eq!(body.records.len(), 1);
        assert_eq!(body.total, Some(7));
    }

    #[test]
    fn parses_data_envelope_with_count() {
        let body = PageBody::from_json(json!({ "data": [{ "id": "a" }], "count": 3 }));
        assert_eq!(body.records.len(), 1);
        assert_eq!(body.total, Some(3));
    }

    #[test]
    fn single_object_is_one_record() {
        let body = PageBody::from_json(json!({ "id": "only" }));
        assert_eq!(body.records, vec![json!({ "id": "only" })]);
        assert_eq!(body.total, Some(1));
    }

    #[test]
    fn scalar_body_is_empty() {
        let body = PageBody::from_json(json!("nope"));
        assert!(body.records.is_empty());
        assert_eq!(body.total, Some(0));
    }

    #[test]
    fn record_key_prefers_id_then_wcid_then_mac_timestamp() {
        assert_eq!(record_key(&json!({ "id": "x", "wcid": "y" })), "x");
        assert_eq!(record_key(&json!({ "wcid": "y", "mac": "m" })), "y");
        assert_eq!(
            record_key(&json!({ "mac": "aabb", "timestamp": 100 })),
            "aabb-100"
        );
        assert_eq!(
            record_key(&json!({ "device_mac": "ccdd", "timestamp": 5 })),
            "ccdd-5"
        );
        assert_eq!(record_key(&json!({ "id": null, "mac": "ee" })), "ee-");
    }

    #[test]
    fn stops_on_empty_page() {
        let mut c = PageCollector::new(2);
        assert_eq!(c.absorb(page(vec![], None)), Some(StopReason::EmptyPage));
        assert!(c.is_empty());
    }

    #[test]
    fn stops_on_short_page() {
        let mut c = PageCollector::new(2);
        assert_eq!(
            c.absorb(page(vec![json!({ "id": 1 })], None)),
            Some(StopReason::ShortPage)
        );
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn stops_when_total_reached() {
        let mut c = PageCollector::new(2);
        let first = page(vec![json!({ "id": 1 }), json!({ "id": 2 })], Some(4));
        let second = page(vec![json!({ "id": 3 }), json!({ "id": 4 })], Some(4));
        assert_eq!(c.absorb(first), None);
        assert_eq!(c.absorb(second), Some(StopReason::TotalReached));
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn stops_when_page_repeats() {
        let mut c = PageCollector::new(2);
        let records = vec![json!({ "id": 1 }), json!({ "id": 2 })];
        assert_eq!(c.absorb(page(records.clone(), None)), None);
        assert_eq!(
            c.absorb(page(records, None)),
            Some(StopReason::NoNewRecords)
        );
        assert_eq!(c.len(), 2);
        assert_eq!(c.pages(), 2);
    }

    #[test]
    fn dedups_within_a_page() {
        let mut c = PageCollector::new(3);
        let records = vec![json!({ "id": 1 }), json!({ "id": 1 }), json!({ "id": 2 })];
        assert_eq!(c.absorb(page(records, None)), None);
        assert_eq!(c.into_records().len(), 2);
    }

    #[test]
    fn stops_at_page_cap() {
        let mut c = PageCollector::new(1);
        let mut stop = None;
        for i in 0..u64::from(MAX_PAGES) + 5 {
            stop = c.absorb(page(vec![json!({ "id": i })], None));
            if stop.is_some() {
                break;
            }
        }
        assert_eq!(stop, Some(StopReason::PageCap));
        assert_eq!(c.pages(), 51);
    }

    #[test]
    fn into_result_keeps_partial_records() {
        let fetched = Fetched {
            records: vec![1, 2],
            pages: 1,
            skipped: 0,
            stop: None,
            aborted: Some(Error::Api {
                status: 500,
                message: "boom".into(),
            }),
        };
        assert!(fetched.is_partial());
        assert_eq!(fetched.into_result().unwrap(), vec![1, 2]);
    }

    #[test]
    fn into_result_surfaces_error_when_empty() {
        let fetched: Fetched<u8> = Fetched {
            records: vec![],
            pages: 1,
            skipped: 0,
            stop: None,
            aborted: Some(Error::Authentication {
                message: "bad token".into(),
            }),
        };
        assert!(fetched.into_result().unwrap_err().is_auth());
    }
}
