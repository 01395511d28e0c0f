use arkham_horror_mcp::config::Config;
use arkham_horror_mcp::error::ArkhamError;
use arkham_horror_mcp::fetcher::{Fetcher, HttpFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.http.timeout_secs = 5;
    config.scenarios.list_url = format!("{}/scenarios/", server.uri());
    config.scenarios.link_prefix = format!("{}/index.php/", server.uri());
    config.cards.api_url = format!("{}/api/public/cards/", server.uri());
    config
}

fn listing(base: &str) -> String {
    format!(
        r#"<html><body>
<nav><a href="{base}/index.php/about/">About</a></nav>
<div class="entry-content">
  <p><a href="{base}/index.php/the-gathering-remix/">The Gathering Remix (1-4 players)</a></p>
  <p><a href="{base}/index.php/night-of-the-zealot/">Night of the Zealot, Difficulty: Expert</a></p>
  <p><a href="https://elsewhere.test/x/">Offsite</a></p>
</div>
</body></html>"#
    )
}

const CARDS: &str = r#"[
  {"code": "01001", "name": "Roland Banks", "type_code": "investigator", "type_name": "Investigator",
   "faction_name": "Guardian", "pack_name": "Core Set", "text": "Elder Sign effect."},
  {"code": "01016", "name": ".45 Automatic", "type_code": "asset", "type_name": "Asset",
   "subtype_name": null, "faction_name": "Guardian", "pack_name": "Core Set", "cost": 4}
]"#;

#[tokio::test]
async fn test_scrapes_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scenarios/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&server.uri())))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&server)).unwrap();
    let records = fetcher.fetch_scenarios().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "the-gathering-remix");
    assert_eq!(records[0].metadata.min_players, Some(1));
    assert_eq!(records[0].metadata.max_players, Some(4));
    assert_eq!(records[1].id, "night-of-the-zealot");
    assert_eq!(records[1].metadata.difficulty.as_deref(), Some("expert"));
}

#[tokio::test]
async fn test_detail_returns_content_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scenarios/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index.php/night-of-the-zealot/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><div class="scenario-content"><p>Setup</p></div><footer>x</footer></html>"#,
        ))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&server)).unwrap();
    let records = fetcher.fetch_scenarios().await.unwrap();
    let content = fetcher.fetch_scenario_detail(&records[1]).await.unwrap();

    assert_eq!(content, "<p>Setup</p>");
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scenarios/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&server)).unwrap();
    let err = fetcher.fetch_scenarios().await.unwrap_err();

    match err {
        ArkhamError::UpstreamStatus { status, .. } => assert_eq!(status.as_u16(), 503),
        other => panic!("expected UpstreamStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cards_with_type_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/cards/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CARDS))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&server)).unwrap();

    let all = fetcher.fetch_cards(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].cost, Some(4));
    assert_eq!(all[1].subtype, "");
    assert_eq!(all[1].source, "arkhamdb");

    let investigators = fetcher.fetch_cards(Some("investigator")).await.unwrap();
    assert_eq!(investigators.len(), 1);
    assert_eq!(investigators[0].name, "Roland Banks");
    assert_eq!(investigators[0].cost, None);
}

#[tokio::test]
async fn test_malformed_card_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/cards/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&config_for(&server)).unwrap();
    let err = fetcher.fetch_cards(None).await.unwrap_err();

    assert!(matches!(err, ArkhamError::InvalidResponse(_)));
}
