//! Terminal output: progress spinners, run header and the report summary.
//!
//! Progress and status go to stderr; the summary table goes to stdout so
//! it can be captured. Colour is used only on a terminal without `NO_COLOR`.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use mistly_core::{ReportFormat, ReportStatistics, Theme, Written};

// ── Color helpers ────────────────────────────────────────────────────

fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_owned() }
}

// ── Progress ─────────────────────────────────────────────────────────

/// Spinner on stderr; hidden when quiet or not on a terminal.
pub fn spinner(message: impl Into<Cow<'static, str>>, quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn step_done(quiet: bool, message: &str) {
    if !quiet {
        eprintln!("  ✓ {message}");
    }
}

// ── Run header ───────────────────────────────────────────────────────

pub struct RunHeader<'a> {
    pub org_id: &'a str,
    pub base_url: &'a str,
    pub theme: Theme,
    pub days: u32,
    pub site: Option<&'a str>,
    pub connection_type: Option<&'a str>,
    pub formats: &'a [ReportFormat],
}

pub fn print_run_header(header: &RunHeader<'_>) {
    let formats: Vec<&'static str> = header.formats.iter().map(|f| f.extension()).collect();
    eprintln!("🚀 Mist endpoint report");
    eprintln!("   Organization: {}", header.org_id);
    eprintln!("   API endpoint: {}", header.base_url);
    eprintln!("   Theme:        {}", header.theme);
    eprintln!("   Days:         {}", header.days);
    if let Some(site) = header.site {
        eprintln!("   Site filter:  {site}");
    }
    if let Some(kind) = header.connection_type {
        eprintln!("   Connection:   {kind}");
    }
    eprintln!("   Formats:      {}", formats.join(", "));
}

// ── Summary ──────────────────────────────────────────────────────────

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn summary_rows(stats: &ReportStatistics) -> Vec<SummaryRow> {
    let row = |metric, value: String| SummaryRow { metric, value };
    let mut rows = vec![
        row("Total Endpoints", stats.total_devices.to_string()),
        row("Active (24h)", stats.active_last_24h.to_string()),
        row("Active (7d)", stats.active_last_7d.to_string()),
        row("Never Seen", stats.never_seen.to_string()),
        row("With Auth Rules", stats.with_auth_rules.to_string()),
        row("Wireless Devices", stats.connection_count("Wireless").to_string()),
        row("Wired Devices", stats.connection_count("Wired").to_string()),
        row("Compliance Rate", format!("{:.1}%", stats.compliance_rate)),
        row("Activity Rate (7d)", format!("{:.1}%", stats.activity_rate())),
    ];
    let top = stats.top_sites(3);
    if !top.is_empty() {
        let sites: Vec<String> = top
            .iter()
            .map(|(site, count)| format!("{site}: {count}"))
            .collect();
        rows.push(row("Top Sites", sites.join(", ")));
    }
    rows
}

/// Summary table plus one line per written (or failed) format.
pub fn render_summary(stats: &ReportStatistics, written: &[Written], dir: &Path) -> String {
    let color = should_color();
    let mut out = String::new();

    let _ = writeln!(out, "{}", paint("📊 Report Summary", color, |t| t.bold().to_string()));
    let _ = writeln!(out, "{}", Table::new(summary_rows(stats)).with(Style::rounded()));

    for w in written {
        let line = match w.result {
            Ok(ref path) => paint(
                &format!("  ✓ {:<5} {}", w.format, path.display()),
                color,
                |t| t.green().to_string(),
            ),
            Err(ref e) => paint(&format!("  ✗ {:<5} {e}", w.format), color, |t| {
                t.yellow().to_string()
            }),
        };
        let _ = writeln!(out, "{line}");
    }
    let _ = write!(out, "📁 Reports saved in: {}/", dir.display());
    out
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
