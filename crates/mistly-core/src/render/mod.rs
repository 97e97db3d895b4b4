// ── Report rendering ──
//
// Four independent serializers over the same rows and statistics. Each
// produces bytes; `publish` moves them onto disk atomically so a crash
// never leaves a truncated report under its final name.

pub mod csv;
pub mod html;
pub mod json;
pub mod xlsx;

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::report::{EndpointRow, ReportStatistics};

/// File name stem shared by every format.
pub const REPORT_STEM: &str = "mist_endpoint_report";

// ── Formats ─────────────────────────────────────────────────────────

/// Output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportFormat {
    Html,
    Csv,
    Json,
    #[strum(to_string = "excel", serialize = "xlsx")]
    Excel,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Excel => "xlsx",
        }
    }

    /// Whether this build can produce the format.
    pub fn is_available(self) -> bool {
        !matches!(self, Self::Excel) || cfg!(feature = "xlsx")
    }
}

// ── Themes ──────────────────────────────────────────────────────────

/// HTML colour theme.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Sunset,
    Ocean,
    Forest,
    Dark,
    Corporate,
}

impl Theme {
    /// `(background, accent)` colours.
    pub fn colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Default => ("#4A90E2", "#357ABD"),
            Self::Sunset => ("#FF6B35", "#E55A2B"),
            Self::Ocean => ("#0077BE", "#005A8B"),
            Self::Forest => ("#228B22", "#1F7A1F"),
            Self::Dark => ("#2C3E50", "#34495E"),
            Self::Corporate => ("#1E3A8A", "#1E40AF"),
        }
    }
}

// ── Context ─────────────────────────────────────────────────────────

/// Everything a renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub rows: &'a [EndpointRow],
    pub stats: &'a ReportStatistics,
    pub theme: Theme,
    /// Local wall-clock time of the run; also the reference for activity icons.
    pub generated_at: NaiveDateTime,
}

/// Render one format to bytes.
pub fn render(format: ReportFormat, ctx: &RenderContext<'_>) -> Result<Vec<u8>, CoreError> {
    match format {
        ReportFormat::Html => Ok(html::render(ctx).into_bytes()),
        ReportFormat::Csv => csv::render(ctx.rows),
        ReportFormat::Json => json::render(ctx),
        ReportFormat::Excel => xlsx::render(ctx),
    }
}

/// `mist_endpoint_report_<YYYYMMDD_HHMMSS>.<ext>`
pub fn report_file_name(generated_at: NaiveDateTime, format: ReportFormat) -> String {
    format!(
        "{REPORT_STEM}_{}.{}",
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

// ── Output ──────────────────────────────────────────────────────────

/// Requested mode for published reports, before the umask.
#[cfg(unix)]
const REPORT_MODE: u32 = 0o644;

/// Write `bytes` to `dir/file_name` via a temp file in the same directory.
pub fn publish(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CoreError> {
    std::fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;
    let target = dir.join(file_name);

    let mut builder = tempfile::Builder::new();
    builder.prefix(".mistly-report-");
    #[cfg(unix)]
    {
        // The umask still applies.
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(REPORT_MODE));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(|e| CoreError::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .map_err(|e| CoreError::io(tmp.path(), e))?;
    tmp.persist(&target)
        .map_err(|e| CoreError::io(&target, e.error))?;
    Ok(target)
}

/// Outcome of writing one format.
#[derive(Debug)]
pub struct Written {
    pub format: ReportFormat,
    pub result: Result<PathBuf, CoreError>,
}

/// Render and publish every requested format into `dir`.
///
/// A failing format is logged and reported; the rest still run.
pub fn write_reports(
    dir: &Path,
    formats: &[ReportFormat],
    ctx: &RenderContext<'_>,
) -> Vec<Written> {
    formats
        .iter()
        .map(|&format| {
            let file_name = report_file_name(ctx.generated_at, format);
            let result =
                render(format, ctx).and_then(|bytes| publish(dir, &file_name, &bytes));
            match result {
                Ok(ref path) => info!(%format, path = %path.display(), "report written"),
                Err(ref e) => warn!(%format, error = %e, "skipping report format"),
            }
            Written { format, result }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn format_names_and_extensions() {
        assert_eq!("HTML".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert_eq!("excel".parse::<ReportFormat>().unwrap(), ReportFormat::Excel);
        assert_eq!("xlsx".parse::<ReportFormat>().unwrap(), ReportFormat::Excel);
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Excel.to_string(), "excel");
        assert_eq!(ReportFormat::Excel.extension(), "xlsx");
    }

    #[test]
    fn theme_lookup() {
        assert_eq!("ocean".parse::<Theme>().unwrap().colors(), ("#0077BE", "#005A8B"));
        assert_eq!(Theme::default().colors().0, "#4A90E2");
        assert!("neon".parse::<Theme>().is_err());
    }

    #[test]
    fn file_name_uses_timestamp() {
        assert_eq!(
            report_file_name(at(), ReportFormat::Excel),
            "mist_endpoint_report_20240102_030405.xlsx"
        );
    }

    #[test]
    fn publish_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Reports");
        let path = publish(&out, "a.csv", b"x,y\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"x,y\n");
        // Only the final file remains.
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn published_reports_follow_umask_not_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = publish(dir.path(), "r.html", b"<html></html>").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;

        // A plain write shows what the current umask allows.
        let plain = dir.path().join("plain");
        std::fs::write(&plain, b"").unwrap();
        let allowed = std::fs::metadata(&plain).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, REPORT_MODE & allowed, "mode {mode:o}");
    }

    #[test]
    fn publish_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        publish(dir.path(), "r.json", b"old").unwrap();
        let path = publish(dir.path(), "r.json", b"new").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new");
    }
}
