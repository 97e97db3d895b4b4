// ── Interactive HTML report ──
//
// A single self-contained page: themed stat cards, a sortable/filterable
// table and a details section. Markup goes through maud so every row value
// is escaped; only the fixed stylesheet and script are emitted raw.

use chrono::{Duration, NaiveDateTime};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use super::RenderContext;
use crate::model::{NEVER, parse_last_seen, title_case};
use crate::report::{EndpointRow, ReportStatistics};

/// Column order on the page (differs from the tabular formats).
const HTML_COLUMNS: [&str; 10] = [
    "Name",
    "MAC Address",
    "Labels",
    "Description",
    "Last Seen",
    "Auth Type",
    "Site",
    "Connection Type",
    "SSID/Port",
    "Matched Auth Policy Rule",
];

const MATERIAL_SYMBOLS: &str = "https://fonts.googleapis.com/css2?family=Material+Symbols+Outlined:opsz,wght,FILL,GRAD@20..48,100..700,0..1,-50..200";

/// How recently a row was seen, relative to the report time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Within the last 24 hours.
    Recent,
    Older,
    Never,
    /// `Last Seen` could not be parsed.
    Unknown,
}

impl Activity {
    pub fn classify(last_seen: &str, now: NaiveDateTime) -> Self {
        if last_seen == NEVER {
            return Self::Never;
        }
        match parse_last_seen(last_seen) {
            Some(seen) if seen >= now - Duration::hours(24) => Self::Recent,
            Some(_) => Self::Older,
            None => Self::Unknown,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Recent => "🟢",
            Self::Older => "🟡",
            Self::Never => "❌",
            Self::Unknown => "❓",
        }
    }

    fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Recent => Some("recently-active"),
            Self::Never => Some("never-seen"),
            Self::Older | Self::Unknown => None,
        }
    }
}

pub fn render(ctx: &RenderContext<'_>) -> String {
    page(ctx).into_string()
}

fn page(ctx: &RenderContext<'_>) -> Markup {
    let theme: &'static str = ctx.theme.into();
    let generated = ctx.generated_at.format("%B %d, %Y at %I:%M:%S %p").to_string();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Enhanced Mist Endpoint Report" }
                link href=(MATERIAL_SYMBOLS) rel="stylesheet";
                style { (PreEscaped(stylesheet(ctx.theme.colors()))) }
                script { (PreEscaped(SCRIPT)) }
            }
            body {
                div class="container" {
                    h1 { "🌐 Enhanced Mist Endpoint Report" }
                    div class="subtitle" {
                        "Generated on " (generated) " - Theme: " (title_case(theme))
                    }
                    (stat_cards(ctx.stats))
                    (controls())
                    table {
                        thead {
                            tr {
                                @for (idx, column) in HTML_COLUMNS.iter().enumerate() {
                                    th onclick={ "sortTable(" (idx) ")" } { (column) }
                                }
                            }
                        }
                        tbody {
                            @for row in ctx.rows {
                                (table_row(row, ctx.generated_at))
                            }
                        }
                    }
                    (details(ctx.stats))
                }
            }
        }
    }
}

fn stat_cards(stats: &ReportStatistics) -> Markup {
    let cards = [
        (stats.total_devices.to_string(), "Total Devices"),
        (stats.active_last_24h.to_string(), "Active Last 24h"),
        (stats.active_last_7d.to_string(), "Active Last 7d"),
        (stats.never_seen.to_string(), "Never Seen"),
        (stats.with_auth_rules.to_string(), "With Auth Rules"),
        (format!("{:.1}%", stats.compliance_rate), "Compliance Rate"),
    ];
    html! {
        div class="stats-grid" {
            @for (value, label) in &cards {
                div class="stat-card" {
                    div class="stat-number" { (value) }
                    div class="stat-label" { (label) }
                }
            }
        }
    }
}

fn controls() -> Markup {
    html! {
        div class="controls" {
            button class="download-btn" onclick="downloadCSV()" { "📥 Download Filtered CSV" }
            button class="download-btn" onclick="showOnlyNeverSeen()" { "👻 Show Never Seen" }
            button class="download-btn" onclick="showAll()" { "🔄 Show All" }
            input type="text" id="tableFilter" class="filter-input"
                placeholder="🔍 Filter endpoints..." onkeyup="filterTable()";
            span id="filterStats" {}
        }
    }
}

fn table_row(row: &EndpointRow, now: NaiveDateTime) -> Markup {
    let activity = Activity::classify(&row.last_seen, now);
    html! {
        tr {
            td { (or_placeholder(&row.name, "Unnamed Device")) }
            td { (row.mac) }
            td { (row.labels) }
            td { (or_placeholder(&row.description, "No description")) }
            td class=[activity.css_class()] { (activity.icon()) " " (row.last_seen) }
            td { (row.auth_type) }
            td { "🏢 " (row.site_name) }
            td { (connection_cell(&row.connection_type)) }
            td { (row.ssid_or_port) }
            td { (row.matched_rule) }
        }
    }
}

fn connection_cell(connection_type: &str) -> Markup {
    let symbol = match connection_type.to_lowercase().as_str() {
        "wireless" => Some(("wifi", "connection-wireless")),
        "wired" => Some(("lan", "connection-wired")),
        _ => None,
    };
    html! {
        @if let Some((icon, class)) = symbol {
            span class={ "material-symbols-outlined " (class) } { (icon) }
            (connection_type)
        } @else {
            "❓ " (connection_type)
        }
    }
}

fn details(stats: &ReportStatistics) -> Markup {
    let connections = stats
        .by_connection_type
        .iter()
        .map(|(kind, count)| format!("{}: {count}", title_case(kind)))
        .collect::<Vec<_>>()
        .join(" | ");
    let sites = stats
        .top_sites(5)
        .into_iter()
        .map(|(site, count)| format!("{site}: {count}"))
        .collect::<Vec<_>>()
        .join(" | ");
    html! {
        div class="performance-info" {
            h3 { "📊 Report Details" }
            p { strong { "Coverage:" } " User MACs database and NAC client activity" }
            p {
                strong { "Activity Indicators:" }
                " 🟢 Active (24h) | 🟡 Older | ❌ Never Seen | "
                span class="material-symbols-outlined connection-wireless" { "wifi" } " Wireless | "
                span class="material-symbols-outlined connection-wired" { "lan" } " Wired"
            }
            p { strong { "Connection Types:" } " " (connections) }
            p { strong { "Top Sites:" } " " (sites) }
        }
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

fn stylesheet((bg, accent): (&str, &str)) -> String {
    format!(
        r#"
body {{ font-family: Arial, sans-serif; margin: 20px; background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%); }}
.container {{ max-width: 1400px; margin: 0 auto; background: white; padding: 20px; border-radius: 10px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }}
.material-symbols-outlined {{ vertical-align: middle; margin-right: 6px; font-size: 18px; }}
.connection-wired {{ color: #1565c0; }}
.connection-wireless {{ color: #2e7d32; }}
h1 {{ color: #333; text-align: center; margin-bottom: 10px; }}
.subtitle {{ text-align: center; color: #666; margin-bottom: 20px; }}
.stats-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin: 20px 0; }}
.stat-card {{ background: linear-gradient(135deg, {bg} 0%, {accent} 100%); color: white; padding: 15px; border-radius: 8px; text-align: center; }}
.stat-number {{ font-size: 2em; font-weight: bold; margin-bottom: 5px; }}
.stat-label {{ font-size: 0.9em; opacity: 0.9; }}
table {{ border-collapse: collapse; width: 100%; margin-top: 20px; }}
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; font-size: 0.9em; }}
th {{ background: {bg}; color: white; cursor: pointer; user-select: none; font-weight: bold; }}
th:hover {{ background: {accent}; }}
th.sort-asc::after {{ content: " ▲"; }}
th.sort-desc::after {{ content: " ▼"; }}
tr:nth-child(even) {{ background-color: #f8f9fa; }}
tr:hover {{ background-color: #e8f4fd; }}
.never-seen {{ color: #dc3545; font-style: italic; font-weight: bold; }}
.recently-active {{ color: #28a745; font-weight: bold; }}
.download-btn {{ background: {bg}; color: white; padding: 12px 24px; border: none; border-radius: 6px; cursor: pointer; margin: 10px 5px; font-size: 14px; font-weight: bold; transition: all 0.3s ease; }}
.download-btn:hover {{ background: {accent}; transform: translateY(-1px); box-shadow: 0 4px 8px rgba(0,0,0,0.2); }}
.controls {{ margin: 20px 0; display: flex; flex-wrap: wrap; gap: 10px; align-items: center; }}
.filter-input {{ padding: 8px; border-radius: 4px; border: 1px solid #ddd; min-width: 200px; }}
#filterStats {{ margin-left: 10px; color: #666; }}
.performance-info {{ background: #f8f9fa; padding: 15px; border-radius: 8px; margin: 20px 0; border-left: 4px solid {bg}; }}
"#
    )
}

// Last Seen is column 4 in the page layout.
const SCRIPT: &str = r#"
const LAST_SEEN_COL = 4;
const ICONS = /[🟢🟡❌❓]/gu;

function bodyRows() {
  return Array.from(document.querySelectorAll("tbody tr"));
}

function cellText(cell) {
  return cell.textContent.replace(ICONS, "").trim();
}

function sortTable(col) {
  const headers = document.querySelectorAll("thead th");
  const header = headers[col];
  const ascending = header.dataset.sortDir !== "asc";
  headers.forEach(th => th.classList.remove("sort-asc", "sort-desc"));
  header.dataset.sortDir = ascending ? "asc" : "desc";
  header.classList.add(ascending ? "sort-asc" : "sort-desc");

  const dir = ascending ? 1 : -1;
  const rows = bodyRows();
  rows.sort((a, b) => {
    const x = cellText(a.cells[col]);
    const y = cellText(b.cells[col]);
    const xNever = x.includes("Never");
    const yNever = y.includes("Never");
    if (xNever || yNever) {
      return xNever === yNever ? 0 : (xNever ? 1 : -1);
    }
    if (col === LAST_SEEN_COL) {
      const dx = new Date(x);
      const dy = new Date(y);
      if (!isNaN(dx) && !isNaN(dy)) {
        return (dx - dy) * dir;
      }
    }
    return x.localeCompare(y, undefined, { numeric: true }) * dir;
  });
  const tbody = document.querySelector("tbody");
  rows.forEach(row => tbody.appendChild(row));
}

function filterTable() {
  const needle = document.getElementById("tableFilter").value.toLowerCase();
  bodyRows().forEach(row => {
    row.style.display = row.textContent.toLowerCase().includes(needle) ? "" : "none";
  });
  updateFilterStats();
}

function updateFilterStats() {
  const rows = bodyRows();
  const visible = rows.filter(row => row.style.display !== "none").length;
  document.getElementById("filterStats").textContent =
    `Showing ${visible} of ${rows.length} endpoints`;
}

function csvField(text) {
  return /[",\n]/.test(text) ? `"${text.replace(/"/g, '""')}"` : text;
}

function downloadCSV() {
  const lines = [];
  document.querySelectorAll("table tr").forEach(row => {
    if (row.style.display === "none") return;
    const cells = Array.from(row.querySelectorAll("th, td"));
    lines.push(cells.map(cell => csvField(cellText(cell))).join(","));
  });
  const blob = new Blob([lines.join("\n") + "\n"], { type: "text/csv" });
  const url = URL.createObjectURL(blob);
  const link = document.createElement("a");
  link.href = url;
  link.download = "mist_endpoint_report_" +
    new Date().toISOString().slice(0, 19).replace(/[:-]/g, "") + ".csv";
  document.body.appendChild(link);
  link.click();
  document.body.removeChild(link);
  URL.revokeObjectURL(url);
}

function showOnlyNeverSeen() {
  bodyRows().forEach(row => {
    row.style.display = row.cells[LAST_SEEN_COL].textContent.includes("Never") ? "" : "none";
  });
  updateFilterStats();
}

function showAll() {
  bodyRows().forEach(row => { row.style.display = ""; });
  document.getElementById("tableFilter").value = "";
  updateFilterStats();
}

window.addEventListener("load", updateFilterStats);
"#;
