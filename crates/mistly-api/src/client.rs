// Mist REST client
//
// Wraps `reqwest::Client` with org-scoped URL construction, token auth and
// the page-based pagination loop. Endpoint methods are thin: they pick the
// path and query parameters and hand off to `fetch_all`.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::models::{NacClient, RawSite, UserMac};
use crate::paginate::{Fetched, PAGE_LIMIT, PageBody, PageCollector};
use crate::transport::TransportConfig;

/// Default Mist cloud endpoint (global region).
pub const DEFAULT_BASE_URL: &str = "https://api.mist.com";

/// Pause between consecutive page requests to stay under the API rate limit.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

// ── NAC query ────────────────────────────────────────────────────────

/// Filters for `nac_clients/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NacQuery {
    /// Window start, epoch seconds.
    pub start: i64,
    /// Window end, epoch seconds.
    pub end: i64,
    pub site_id: Option<String>,
    /// `wired` or `wireless`.
    pub connection_type: Option<String>,
}

impl NacQuery {
    /// Window ending now and reaching back `days` days.
    pub fn last_days(days: u32) -> Self {
        let end = Utc::now().timestamp();
        Self {
            start: end - i64::from(days) * SECONDS_PER_DAY,
            end,
            site_id: None,
            connection_type: None,
        }
    }

    pub fn with_site(mut self, site_id: Option<String>) -> Self {
        self.site_id = site_id;
        self
    }

    pub fn with_connection_type(mut self, connection_type: Option<String>) -> Self {
        self.connection_type = connection_type;
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("start", self.start.to_string()), ("end", self.end.to_string())];
        if let Some(ref site) = self.site_id {
            params.push(("site_id", site.clone()));
        }
        if let Some(ref kind) = self.connection_type {
            params.push(("type", kind.clone()));
        }
        params
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the org-scoped Mist API.
///
/// Every listing goes through [`fetch_all`](Self::fetch_all), which walks
/// `page`/`limit` pagination, deduplicates records and keeps whatever it
/// collected if a later page fails.
pub struct MistClient {
    http: reqwest::Client,
    base_url: Url,
    org_id: String,
    page_limit: usize,
    page_delay: Duration,
}

impl MistClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client that sends `Authorization: Token <token>` on every request.
    pub fn new(
        base_url: &str,
        org_id: impl Into<String>,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::InvalidHeader(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client(headers)?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        Ok(Self::with_client(http, base_url, org_id))
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: Url, org_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            org_id: org_id.into(),
            page_limit: PAGE_LIMIT,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }

    /// Override the pause between page requests.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Override the page size.
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/api/v1/orgs/{org_id}/{endpoint}`
    fn org_url(&self, endpoint: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/api/v1/orgs/{}/{endpoint}",
            self.org_id
        ))?)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// All sites in the organization.
    pub async fn list_sites(&self) -> Fetched<RawSite> {
        self.fetch_all("sites", &[]).await
    }

    /// Every user MAC (device inventory) in the organization.
    pub async fn search_user_macs(&self) -> Fetched<UserMac> {
        self.fetch_all("usermacs/search", &[]).await
    }

    /// NAC authentication events matching `query`.
    pub async fn search_nac_clients(&self, query: &NacQuery) -> Fetched<NacClient> {
        info!(
            start = query.start,
            end = query.end,
            site = ?query.site_id,
            connection_type = ?query.connection_type,
            "querying NAC clients"
        );
        self.fetch_all("nac_clients/search", &query.params()).await
    }

    // ── Pagination loop ──────────────────────────────────────────────

    /// Fetch every page of `endpoint`, decoding unique records into `T`.
    ///
    /// Records that fail to decode are skipped and counted. A request
    /// failure ends pagination; records gathered up to that point are kept
    /// and the error is returned in [`Fetched::aborted`].
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Fetched<T> {
        let mut collector = PageCollector::new(self.page_limit);
        let mut stop = None;
        let mut aborted = None;

        match self.org_url(endpoint) {
            Err(e) => aborted = Some(e),
            Ok(url) => {
                let mut page: u32 = 1;
                loop {
                    debug!(endpoint, page, collected = collector.len(), "fetching page");
                    match self.fetch_page(&url, params, page).await {
                        Ok(body) => {
                            if let Some(reason) = collector.absorb(body) {
                                stop = Some(reason);
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(endpoint, page, error = %e, "pagination aborted");
                            aborted = Some(e);
                            break;
                        }
                    }
                    page += 1;
                    if !self.page_delay.is_zero() {
                        tokio::time::sleep(self.page_delay).await;
                    }
                }
            }
        }

        let pages = collector.pages();
        let mut skipped = 0;
        let records: Vec<T> = collector
            .into_records()
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(endpoint, error = %e, "skipping undecodable record");
                    skipped += 1;
                    None
                }
            })
            .collect();

        info!(endpoint, records = records.len(), pages, skipped, ?stop, "fetch complete");

        Fetched {
            records,
            pages,
            skipped,
            stop,
            aborted,
        }
    }

    /// Fetch and normalize a single page.
    async fn fetch_page(
        &self,
        url: &Url,
        params: &[(&str, String)],
        page: u32,
    ) -> Result<PageBody, Error> {
        let resp = self
            .http
            .get(url.clone())
            .query(params)
            .query(&[("page", page.to_string()), ("limit", self.page_limit.to_string())])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("HTTP {status}: check the API token and org id"),
            });
        }

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        Ok(PageBody::from_json(value))
    }
}
