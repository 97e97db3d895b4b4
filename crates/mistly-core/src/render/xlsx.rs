// ── Excel workbook ──
//
// Sheets: Endpoint Report, Statistics, Connection Types, Sites, Auth Types.
// Built only with the `xlsx` feature; without it the renderer reports the
// format as unavailable and the caller skips it.

use super::RenderContext;
use crate::error::CoreError;

#[cfg(not(feature = "xlsx"))]
pub fn render(_ctx: &RenderContext<'_>) -> Result<Vec<u8>, CoreError> {
    Err(CoreError::FormatUnavailable {
        format: super::ReportFormat::Excel,
    })
}

#[cfg(feature = "xlsx")]
pub fn render(ctx: &RenderContext<'_>) -> Result<Vec<u8>, CoreError> {
    workbook::build(ctx).map_err(|e| CoreError::Workbook {
        message: e.to_string(),
    })
}

#[cfg(feature = "xlsx")]
mod workbook {
    use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

    use super::RenderContext;
    use crate::report::{Breakdown, COLUMNS, ReportStatistics};

    pub(super) fn build(ctx: &RenderContext<'_>) -> Result<Vec<u8>, XlsxError> {
        let header = Format::new().set_bold();
        let mut book = Workbook::new();

        let sheet = book.add_worksheet().set_name("Endpoint Report")?;
        sheet.write_row_with_format(0, 0, COLUMNS, &header)?;
        for (idx, row) in ctx.rows.iter().enumerate() {
            sheet.write_row(row_index(idx + 1)?, 0, row.values())?;
        }
        sheet.autofit();

        summary_sheet(book.add_worksheet(), ctx.stats, &header)?;
        breakdown_sheet(
            book.add_worksheet(),
            "Connection Types",
            "Connection Type",
            &ctx.stats.by_connection_type,
            &header,
        )?;
        breakdown_sheet(book.add_worksheet(), "Sites", "Site", &ctx.stats.by_site, &header)?;
        breakdown_sheet(
            book.add_worksheet(),
            "Auth Types",
            "Auth Type",
            &ctx.stats.by_auth_type,
            &header,
        )?;

        book.save_to_buffer()
    }

    fn summary_sheet(
        sheet: &mut Worksheet,
        stats: &ReportStatistics,
        header: &Format,
    ) -> Result<(), XlsxError> {
        sheet.set_name("Statistics")?;
        sheet.write_row_with_format(0, 0, ["Metric", "Value"], header)?;

        let counts = [
            ("Total Devices", stats.total_devices),
            ("Active Last 24h", stats.active_last_24h),
            ("Active Last 7d", stats.active_last_7d),
            ("Never Seen", stats.never_seen),
            ("With Auth Rules", stats.with_auth_rules),
        ];
        let mut row = 1;
        for (label, value) in counts {
            sheet.write_string(row, 0, label)?;
            sheet.write_number(row, 1, count_value(value))?;
            row += 1;
        }
        sheet.write_string(row, 0, "Compliance Rate (%)")?;
        sheet.write_string(row, 1, format!("{:.1}", stats.compliance_rate))?;
        sheet.autofit();
        Ok(())
    }

    fn breakdown_sheet(
        sheet: &mut Worksheet,
        name: &str,
        label: &str,
        breakdown: &Breakdown,
        header: &Format,
    ) -> Result<(), XlsxError> {
        sheet.set_name(name)?;
        sheet.write_row_with_format(0, 0, [label, "Count"], header)?;
        for (idx, (value, count)) in breakdown.iter().enumerate() {
            let row = row_index(idx + 1)?;
            sheet.write_string(row, 0, value)?;
            sheet.write_number(row, 1, count_value(*count))?;
        }
        sheet.autofit();
        Ok(())
    }

    fn row_index(idx: usize) -> Result<u32, XlsxError> {
        u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
    }

    fn count_value(count: usize) -> f64 {
        u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
    }
}
