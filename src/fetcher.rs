//! Upstream data retrieval.
//!
//! The [`Fetcher`] trait is the seam between the catalog and the outside
//! world: the scenario listing and detail pages (scraped HTML) and the card
//! database (JSON). [`HttpFetcher`] is the production implementation; tests
//! substitute scripted fetchers.
//!
//! Parsing is split into pure functions ([`parse_scenario_listing`],
//! [`extract_scenario_content`], [`parse_cards`]) so it can be tested on
//! literal input without a network.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client};
use serde::Deserialize;
use tracing::debug;

use crate::config::{CardSourceConfig, Config, ScenarioSourceConfig};
use crate::error::{ArkhamError, ArkhamResult};
use crate::html;
use crate::metadata::extract_metadata;
use crate::models::{CardRecord, ScenarioRecord, CARD_SOURCE, SCENARIO_SOURCE};

/// Class of the WordPress container holding the scenario links.
const LISTING_CONTAINER_CLASS: &str = "entry-content";

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Retrieves raw scenario and card data from upstream sources.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Scrape the scenario listing into records.
    async fn fetch_scenarios(&self) -> ArkhamResult<Vec<ScenarioRecord>>;

    /// Fetch the detail page for a scenario and return its main content.
    async fn fetch_scenario_detail(&self, scenario: &ScenarioRecord) -> ArkhamResult<String>;

    /// Fetch cards, optionally keeping only one card type (e.g. `"investigator"`).
    async fn fetch_cards(&self, type_filter: Option<&str>) -> ArkhamResult<Vec<CardRecord>>;
}

/// [`Fetcher`] backed by `reqwest`.
/// Clone is cheap - reqwest::Client shares its connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    scenarios: ScenarioSourceConfig,
    cards: CardSourceConfig,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> ArkhamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            scenarios: config.scenarios.clone(),
            cards: config.cards.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> ArkhamResult<String> {
        debug!(url, "fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArkhamError::UpstreamStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_scenarios(&self) -> ArkhamResult<Vec<ScenarioRecord>> {
        let body = self.get_text(&self.scenarios.list_url).await?;
        let records = parse_scenario_listing(&body, &self.scenarios.link_prefix);
        debug!(count = records.len(), "parsed scenario listing");
        Ok(records)
    }

    async fn fetch_scenario_detail(&self, scenario: &ScenarioRecord) -> ArkhamResult<String> {
        let body = self.get_text(&scenario.url).await?;
        Ok(extract_scenario_content(&body, &self.scenarios.content_class))
    }

    async fn fetch_cards(&self, type_filter: Option<&str>) -> ArkhamResult<Vec<CardRecord>> {
        let body = self.get_text(&self.cards.api_url).await?;
        let cards = parse_cards(&body, type_filter)?;
        debug!(count = cards.len(), ?type_filter, "parsed cards");
        Ok(cards)
    }
}

// ============ Parsing ============

/// Turn the listing page into scenario records.
///
/// Links are taken from the `entry-content` container (or the whole page if
/// it is missing). Only links under `link_prefix` with visible text count.
/// The first link wins when two share a slug.
pub fn parse_scenario_listing(page: &str, link_prefix: &str) -> Vec<ScenarioRecord> {
    let container = html::inner_html_by_class(page, LISTING_CONTAINER_CLASS).unwrap_or(page);

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for anchor in html::anchors(container) {
        if anchor.text.is_empty() || !anchor.href.starts_with(link_prefix) {
            continue;
        }
        let Some(id) = html::slug_from_url(&anchor.href) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }

        records.push(ScenarioRecord {
            id,
            description: format!("Arkham Horror scenario: {}", anchor.text),
            metadata: extract_metadata(&anchor.text),
            title: anchor.text,
            url: anchor.href,
            source: SCENARIO_SOURCE.to_string(),
        });
    }

    records
}

/// Main content of a scenario page, or the whole page when the content
/// element cannot be found.
pub fn extract_scenario_content(page: &str, content_class: &str) -> String {
    match html::inner_html_by_class(page, content_class) {
        Some(inner) => inner.trim().to_string(),
        None => page.to_string(),
    }
}

/// Card as served by the public card API.
#[derive(Debug, Deserialize)]
struct ApiCard {
    code: String,
    name: String,
    #[serde(default)]
    type_code: Option<String>,
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default)]
    subtype_name: Option<String>,
    #[serde(default)]
    faction_name: Option<String>,
    #[serde(default)]
    pack_name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    cost: Option<i64>,
}

impl ApiCard {
    fn matches_type(&self, wanted: &str) -> bool {
        [&self.type_code, &self.type_name]
            .into_iter()
            .flatten()
            .any(|t| t.eq_ignore_ascii_case(wanted))
    }

    fn into_record(self) -> CardRecord {
        CardRecord {
            id: self.code,
            name: self.name,
            card_type: self.type_name.or(self.type_code).unwrap_or_default(),
            subtype: self.subtype_name.unwrap_or_default(),
            faction: self.faction_name.unwrap_or_default(),
            pack: self.pack_name.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            cost: self.cost,
            source: CARD_SOURCE.to_string(),
        }
    }
}

/// Decode the card API body, keeping only `type_filter` cards when given.
pub fn parse_cards(body: &str, type_filter: Option<&str>) -> ArkhamResult<Vec<CardRecord>> {
    let cards: Vec<ApiCard> = serde_json::from_str(body)
        .map_err(|e| ArkhamError::InvalidResponse(format!("card api: {}", e)))?;

    let wanted = type_filter.map(str::trim).filter(|t| !t.is_empty());

    Ok(cards
        .into_iter()
        .filter(|c| wanted.map_or(true, |w| c.matches_type(w)))
        .map(ApiCard::into_record)
        .collect())
}
