// JSON document: metadata, statistics and every endpoint keyed by column header.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::RenderContext;
use crate::error::CoreError;
use crate::report::{EndpointRow, ReportStatistics};

/// `report_type` tag written into every document.
pub const REPORT_TYPE: &str = "mist_endpoint_report";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: NaiveDateTime,
    pub total_records: usize,
    pub report_type: String,
}

/// Top-level JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub statistics: ReportStatistics,
    pub endpoints: Vec<EndpointRow>,
}

impl ReportDocument {
    pub fn new(ctx: &RenderContext<'_>) -> Self {
        Self {
            metadata: ReportMetadata {
                generated_at: ctx.generated_at,
                total_records: ctx.rows.len(),
                report_type: REPORT_TYPE.to_owned(),
            },
            statistics: ctx.stats.clone(),
            endpoints: ctx.rows.to_vec(),
        }
    }
}

pub fn render(ctx: &RenderContext<'_>) -> Result<Vec<u8>, CoreError> {
    let mut out = serde_json::to_vec_pretty(&ReportDocument::new(ctx))?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::render::Theme;
    use chrono::NaiveDate;
    use serde_json::Value;

    #[test]
    fn document_shape() {
        let stats = ReportStatistics::default();
        let ctx = RenderContext {
            rows: &[],
            stats: &stats,
            theme: Theme::Default,
            generated_at: NaiveDate::from_ymd_opt(2024, 5, 6)
                .unwrap()
                .and_hms_opt(7, 8, 9)
                .unwrap(),
        };
        let value: Value = serde_json::from_slice(&render(&ctx).unwrap()).unwrap();
        assert_eq!(value["metadata"]["report_type"], REPORT_TYPE);
        assert_eq!(value["metadata"]["total_records"], 0);
        assert_eq!(value["metadata"]["generated_at"], "2024-05-06T07:08:09");
        assert_eq!(value["statistics"]["compliance_rate"], 0.0);
        assert!(value["endpoints"].as_array().unwrap().is_empty());
    }
}
