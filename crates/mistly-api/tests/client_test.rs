#![allow(clippy::unwrap_used)]
// Integration tests for `MistClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mistly_api::paginate::StopReason;
use mistly_api::{Error, MistClient, NacQuery, TransportConfig};

const ORG: &str = "11111111-2222-3333-4444-555555555555";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(page_limit: usize) -> (MockServer, MistClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = MistClient::with_client(reqwest::Client::new(), base_url, ORG)
        .with_page_limit(page_limit)
        .with_page_delay(Duration::ZERO);
    (server, client)
}

fn org_path(endpoint: &str) -> String {
    format!("/api/v1/orgs/{ORG}/{endpoint}")
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sends_token_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(org_path("sites")))
        .and(header("authorization", "Token secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "name": "HQ" }
        ])))
        .mount(&server)
        .await;

    let token: SecretString = "secret-token".to_string().into();
    let client = MistClient::new(&server.uri(), ORG, &token, &TransportConfig::default())
        .unwrap()
        .with_page_delay(Duration::ZERO);

    let sites = client.list_sites().await.into_result().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].name.as_deref(), Some("HQ"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup(1000).await;

    Mock::given(method("GET"))
        .and(path(org_path("sites")))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let fetched = client.list_sites().await;
    assert!(fetched.records.is_empty());
    let result = fetched.into_result();
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Response shapes ─────────────────────────────────────────────────

#[tokio::test]
async fn test_results_envelope() {
    let (server, client) = setup(1000).await;

    Mock::given(method("GET"))
        .and(path(org_path("usermacs/search")))
        .and(query_param("page", "1"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": "u1", "mac": "aabbccddeeff", "name": "Printer", "labels": ["floor-2"] },
                { "id": "u2", "mac": "001122334455" }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;

    let fetched = client.search_user_macs().await;
    assert!(!fetched.is_partial());
    assert_eq!(fetched.stop, Some(StopReason::ShortPage));
    let macs = fetched.into_result().unwrap();
    assert_eq!(macs.len(), 2);
    assert_eq!(macs[0].labels.as_deref(), Some(&["floor-2".to_owned()][..]));
}

#[tokio::test]
async fn test_skips_undecodable_records() {
    let (server, client) = setup(1000).await;

    Mock::given(method("GET"))
        .and(path(org_path("usermacs/search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "u1", "mac": "aabbccddeeff" },
                { "id": "u2", "mac": 42 }
            ]
        })))
        .mount(&server)
        .await;

    let fetched = client.search_user_macs().await;
    assert_eq!(fetched.records.len(), 1);
    assert_eq!(fetched.skipped, 1);
}

#[tokio::test]
async fn test_numeric_vlan_does_not_drop_device() {
    let (server, client) = setup(1000).await;

    Mock::given(method("GET"))
        .and(path(org_path("usermacs/search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": "u1", "mac": "aabbccddee01", "vlan": 30 },
                { "id": 2, "mac": "aabbccddee02", "vlan": "guest" }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;

    let fetched = client.search_user_macs().await;
    assert_eq!(fetched.skipped, 0);
    let macs = fetched.into_result().unwrap();
    assert_eq!(macs.len(), 2);
    assert_eq!(macs[0].extra.get("vlan"), Some(&json!(30)));
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_walks_pages_until_short_page() {
    let (server, client) = setup(2).await;

    Mock::given(method("GET"))
        .and(path(org_path("usermacs/search")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "mac": "000000000001" },
            { "id": "b", "mac": "000000000002" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("usermacs/search")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c", "mac": "000000000003" }
        ])))
        .mount(&server)
        .await;

    let fetched = client.search_user_macs().await;
    assert_eq!(fetched.pages, 2);
    assert_eq!(fetched.stop, Some(StopReason::ShortPage));
    assert_eq!(fetched.records.len(), 3);
}

#[tokio::test]
async fn test_stops_when_page_repeats() {
    let (server, client) = setup(2).await;

    // Every page returns the same two records.
    Mock::given(method("GET"))
        .and(path(org_path("usermacs/search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "mac": "000000000001" },
            { "id": "b", "mac": "000000000002" }
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let fetched = client.search_user_macs().await;
    assert_eq!(fetched.stop, Some(StopReason::NoNewRecords));
    assert_eq!(fetched.records.len(), 2);
}

#[tokio::test]
async fn test_stops_when_declared_total_reached() {
    let (server, client) = setup(2).await;

    Mock::given(method("GET"))
        .and(path(org_path("nac_clients/search")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "mac": "000000000001", "timestamp": 100.0 },
                { "mac": "000000000002", "timestamp": 100.0 }
            ],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client.search_nac_clients(&NacQuery::last_days(7)).await;
    assert_eq!(fetched.stop, Some(StopReason::TotalReached));
    assert_eq!(fetched.records.len(), 2);
}

#[tokio::test]
async fn test_server_error_keeps_partial_results() {
    let (server, client) = setup(2).await;

    Mock::given(method("GET"))
        .and(path(org_path("nac_clients/search")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "mac": "000000000001", "timestamp": 100.0 },
            { "mac": "000000000002", "timestamp": 200.0 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(org_path("nac_clients/search")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let fetched = client.search_nac_clients(&NacQuery::last_days(7)).await;
    assert!(fetched.is_partial());
    assert_eq!(fetched.aborted.as_ref().and_then(Error::status), Some(500));
    assert_eq!(fetched.into_result().unwrap().len(), 2);
}

// ── NAC query ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_nac_query_params() {
    let (server, client) = setup(1000).await;

    let query = NacQuery {
        start: 1_700_000_000,
        end: 1_700_604_800,
        site_id: None,
        connection_type: None,
    }
    .with_site(Some("site-9".into()))
    .with_connection_type(Some("wired".into()));

    Mock::given(method("GET"))
        .and(path(org_path("nac_clients/search")))
        .and(query_param("start", "1700000000"))
        .and(query_param("end", "1700604800"))
        .and(query_param("site_id", "site-9"))
        .and(query_param("type", "wired"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "mac": "aabbccddeeff",
                "timestamp": 1_700_000_500.0,
                "last_nacrule_name": "Corp Wired",
                "type": "wired",
                "last_port_id": "ge-0/0/1",
                "auth_type": "eap-tls",
                "site_id": "site-9"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let clients = client
        .search_nac_clients(&query)
        .await
        .into_result()
        .unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].client_type.as_deref(), Some("wired"));
    assert_eq!(clients[0].last_nacrule_name.as_deref(), Some("Corp Wired"));
}
