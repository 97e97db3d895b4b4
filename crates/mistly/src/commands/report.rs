//! `mistly report`: fetch, join, aggregate, render.

use std::time::Duration;

use chrono::Local;
use secrecy::SecretString;
use tracing::{info, warn};

use mistly_api::paginate::Fetched;
use mistly_api::{MistClient, NacQuery, TransportConfig};
use mistly_config::{Settings, resolve_api_token};
use mistly_core::{
    ActivityRecord, IdentityRecord, RenderContext, ReportFormat, ReportStatistics, SiteLookup,
    Theme, build_report, write_reports,
};

use crate::cli::{ConnectionTypeArg, GlobalOpts, ReportArgs, ThemeArg};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ReportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (mut config, _) = util::load_settings(global)?;
    util::apply_overrides(&mut config, global);
    let settings = config.mist;

    let creds = resolve_credentials(global, &settings)?;
    let days = args.days.unwrap_or(settings.days).max(1);
    let theme = args.theme.map_or_else(|| theme_from_config(&settings.theme), theme_of);
    let formats = parse_formats(&args.format);
    if formats.is_empty() {
        return Err(CliError::Validation {
            field: "format".into(),
            reason: "no usable output format (expected html, csv, json or excel)".into(),
        });
    }

    if !global.quiet {
        output::print_run_header(&output::RunHeader {
            org_id: &creds.org_id,
            base_url: &creds.base_url,
            theme,
            days,
            site: args.site.as_deref(),
            connection_type: args.connection_type.map(ConnectionTypeArg::as_str),
            formats: &formats,
        });
    }

    let transport = TransportConfig::default().with_timeout(Duration::from_secs(global.timeout));
    let client = MistClient::new(&creds.base_url, creds.org_id.clone(), &creds.token, &transport)?;
    let plan = Plan {
        days,
        theme,
        formats,
    };

    // Prompts are done; from here Ctrl-C ends the run.
    tokio::select! {
        result = generate(&client, &creds.org_id, &args, &plan, global.quiet) => result,
        Ok(()) = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    }
}

struct Plan {
    days: u32,
    theme: Theme,
    formats: Vec<ReportFormat>,
}

async fn generate(
    client: &MistClient,
    org_id: &str,
    args: &ReportArgs,
    plan: &Plan,
    quiet: bool,
) -> Result<(), CliError> {
    let days = plan.days;

    // 1. Sites
    let bar = output::spinner("Fetching sites", quiet);
    let sites = settle("sites", client.list_sites().await, org_id);
    bar.finish_and_clear();
    let lookup = SiteLookup::from(sites?.as_slice());
    output::step_done(quiet, &format!("{} sites", lookup.len()));

    // 2. User MACs
    let bar = output::spinner("Fetching user MACs", quiet);
    let user_macs = settle("usermacs", client.search_user_macs().await, org_id);
    bar.finish_and_clear();
    let identities: Vec<IdentityRecord> =
        user_macs?.into_iter().map(IdentityRecord::from).collect();
    output::step_done(quiet, &format!("{} user MAC entries", identities.len()));

    // 3. NAC clients
    let query = NacQuery::last_days(days)
        .with_site(args.site.clone())
        .with_connection_type(args.connection_type.map(|c| c.as_str().to_owned()));
    let bar = output::spinner(format!("Fetching NAC clients (last {days} days)"), quiet);
    let nac_clients = settle("nac_clients", client.search_nac_clients(&query).await, org_id);
    bar.finish_and_clear();
    let activities: Vec<ActivityRecord> =
        nac_clients?.into_iter().map(ActivityRecord::from).collect();
    output::step_done(quiet, &format!("{} NAC client records", activities.len()));

    // 4. Join and aggregate
    let report = build_report(&identities, &activities, &lookup);
    let generated_at = Local::now().naive_local();
    let stats = ReportStatistics::compute(&report.rows, generated_at);
    info!(
        endpoints = report.rows.len(),
        matched = report.matched,
        "report built"
    );

    // 5. Render
    let ctx = RenderContext {
        rows: &report.rows,
        stats: &stats,
        theme: plan.theme,
        generated_at,
    };
    let written = write_reports(&args.output_dir, &plan.formats, &ctx);
    if written.iter().all(|w| w.result.is_err()) {
        return Err(CliError::NothingWritten);
    }

    let summary = output::render_summary(&stats, &written, &args.output_dir);
    output::print_output(&summary, quiet);
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

struct Credentials {
    token: SecretString,
    org_id: String,
    base_url: String,
}

/// Flags, environment and config first; prompt for whatever is missing.
fn resolve_credentials(global: &GlobalOpts, settings: &Settings) -> Result<Credentials, CliError> {
    let org_id = settings.org_id.clone().filter(|o| !o.is_empty());
    let token = resolve_api_token(global.token.as_deref(), settings);

    match (token, org_id) {
        (Some(token), Some(org_id)) => Ok(Credentials {
            token,
            org_id,
            base_url: settings.base_url.clone(),
        }),
        (token, org_id) if util::is_interactive() => {
            let wizard = token.is_none() && org_id.is_none();
            let token = match token {
                Some(token) => token,
                None => SecretString::from(util::prompt_token()?),
            };
            let org_id = match org_id {
                Some(org_id) => org_id,
                None => util::prompt_org_id()?,
            };
            let base_url = if wizard {
                util::prompt_base_url()?
            } else {
                settings.base_url.clone()
            };
            Ok(Credentials {
                token,
                org_id,
                base_url,
            })
        }
        (token, _) => Err(CliError::MissingCredentials {
            what: if token.is_none() {
                "API token".into()
            } else {
                "organization ID".into()
            },
        }),
    }
}

// ── Fetch results ───────────────────────────────────────────────────

/// Keep partial results after transport failures; auth failures are fatal.
fn settle<T>(endpoint: &str, fetched: Fetched<T>, org_id: &str) -> Result<Vec<T>, CliError> {
    if fetched.skipped > 0 {
        warn!(endpoint, skipped = fetched.skipped, "records skipped during decoding");
    }
    match fetched.aborted {
        Some(err) if err.is_auth() => Err(CliError::AuthFailed {
            org_id: org_id.to_owned(),
            message: err.to_string(),
        }),
        Some(err) => {
            warn!(
                endpoint,
                records = fetched.records.len(),
                error = %err,
                "fetch ended early; continuing with partial results"
            );
            Ok(fetched.records)
        }
        None => Ok(fetched.records),
    }
}

// ── Argument mapping ────────────────────────────────────────────────

/// Known, available formats in request order. Unknown names are skipped.
fn parse_formats(raw: &[String]) -> Vec<ReportFormat> {
    let mut formats = Vec::new();
    for name in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match name.parse::<ReportFormat>() {
            Ok(format) if !format.is_available() => {
                warn!(format = name, "format not available in this build; skipping");
            }
            Ok(format) => {
                if !formats.contains(&format) {
                    formats.push(format);
                }
            }
            Err(_) => warn!(format = name, "unknown output format; skipping"),
        }
    }
    formats
}

fn theme_of(arg: ThemeArg) -> Theme {
    match arg {
        ThemeArg::Default => Theme::Default,
        ThemeArg::Sunset => Theme::Sunset,
        ThemeArg::Ocean => Theme::Ocean,
        ThemeArg::Forest => Theme::Forest,
        ThemeArg::Dark => Theme::Dark,
        ThemeArg::Corporate => Theme::Corporate,
    }
}

fn theme_from_config(name: &str) -> Theme {
    name.trim().parse().unwrap_or_else(|_| {
        warn!(theme = name, "unknown theme in configuration; using default");
        Theme::Default
    })
}

impl ConnectionTypeArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wired => "wired",
            Self::Wireless => "wireless",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn formats_keep_order_and_drop_unknown() {
        let formats = parse_formats(&names(&["csv", " HTML ", "pdf", "csv", "json"]));
        assert_eq!(
            formats,
            vec![ReportFormat::Csv, ReportFormat::Html, ReportFormat::Json]
        );
    }

    #[test]
    fn excel_aliases() {
        let formats = parse_formats(&names(&["excel", "xlsx"]));
        if ReportFormat::Excel.is_available() {
            assert_eq!(formats, vec![ReportFormat::Excel]);
        } else {
            assert!(formats.is_empty());
        }
    }

    #[test]
    fn excel_follows_binary_feature() {
        assert_eq!(ReportFormat::Excel.is_available(), cfg!(feature = "xlsx"));
    }

    #[test]
    fn config_theme_falls_back_to_default() {
        assert_eq!(theme_from_config("Ocean"), Theme::Ocean);
        assert_eq!(theme_from_config("neon"), Theme::Default);
        assert_eq!(theme_of(ThemeArg::Corporate), Theme::Corporate);
    }

    #[test]
    fn partial_fetch_is_kept() {
        let fetched = Fetched {
            records: vec![1, 2, 3],
            pages: 1,
            skipped: 0,
            stop: None,
            aborted: Some(mistly_api::Error::Api {
                status: 502,
                message: "bad gateway".into(),
            }),
        };
        assert_eq!(settle("sites", fetched, "org").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn auth_failure_is_fatal() {
        let fetched: Fetched<u8> = Fetched {
            records: Vec::new(),
            pages: 0,
            skipped: 0,
            stop: None,
            aborted: Some(mistly_api::Error::Authentication {
                message: "HTTP 401".into(),
            }),
        };
        assert!(matches!(
            settle("usermacs", fetched, "org"),
            Err(CliError::AuthFailed { .. })
        ));
    }
}
