// ── Core error types ──
//
// Failures producing or writing a report. The join and statistics are
// total; only rendering and file output can fail.

use std::path::PathBuf;

use thiserror::Error;

use crate::render::ReportFormat;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Rendering ────────────────────────────────────────────────────
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook generation failed: {message}")]
    Workbook { message: String },

    /// The format was compiled out of this build.
    #[error("{format} output is unavailable in this build")]
    FormatUnavailable { format: ReportFormat },

    // ── Output ───────────────────────────────────────────────────────
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
