//! The catalog: every operation the servers and CLI expose.
//!
//! A [`Catalog`] owns the scenario cache, the upstream fetcher, the note
//! store and the search settings. It is built once at startup and shared
//! behind an `Arc`; nothing here is process-global.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::cache::{CacheStatus, ScenarioCache};
use crate::config::{Config, SearchConfig};
use crate::error::{ArkhamError, ArkhamResult};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::models::{CardRecord, ScenarioRecord, SearchHit};
use crate::notes::{Note, NoteStore};
use crate::search::{self, SearchRequest};

/// URI scheme for MCP resources.
pub const RESOURCE_SCHEME: &str = "arkham";

/// A parsed `arkham://` resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    Scenario(String),
    Note(String),
}

impl ResourceUri {
    /// Parse `arkham://scenario/<id>` or `arkham://note/<name>`.
    pub fn parse(uri: &str) -> ArkhamResult<Self> {
        let invalid = || ArkhamError::InvalidUri(uri.to_string());

        let rest = uri
            .strip_prefix(RESOURCE_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(invalid)?;
        let (kind, key) = rest.split_once('/').ok_or_else(invalid)?;
        if key.is_empty() || key.contains('/') {
            return Err(invalid());
        }

        match kind {
            "scenario" => Ok(ResourceUri::Scenario(key.to_string())),
            "note" => Ok(ResourceUri::Note(key.to_string())),
            _ => Err(invalid()),
        }
    }

    pub fn scenario(id: &str) -> String {
        format!("{}://scenario/{}", RESOURCE_SCHEME, id)
    }

    pub fn note(name: &str) -> String {
        format!("{}://note/{}", RESOURCE_SCHEME, name)
    }
}

pub struct Catalog {
    cache: ScenarioCache,
    fetcher: Arc<dyn Fetcher>,
    notes: NoteStore,
    settings: SearchConfig,
}

impl Catalog {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: SearchConfig) -> Self {
        Self {
            cache: ScenarioCache::new(fetcher.clone()),
            fetcher,
            notes: NoteStore::new(),
            settings,
        }
    }

    /// Catalog backed by the real upstream sites.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config).context("Failed to build HTTP client")?;
        Ok(Self::new(Arc::new(fetcher), config.search.clone()))
    }

    /// All cached scenarios; empty when the upstream is unavailable.
    pub async fn list_scenarios(&self) -> Arc<Vec<ScenarioRecord>> {
        self.cache.get_scenarios().await
    }

    /// Main content of a scenario page.
    ///
    /// The id must be in the scenario cache; the page itself is fetched live.
    pub async fn get_scenario_detail(&self, id: &str) -> ArkhamResult<String> {
        let scenarios = self.cache.get_scenarios().await;
        let scenario = scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ArkhamError::NotFound(format!("scenario '{}'", id)))?;

        self.fetcher.fetch_scenario_detail(scenario).await
    }

    /// Cards from the card database; empty when it is unavailable.
    pub async fn list_cards(&self, type_filter: Option<&str>) -> Vec<CardRecord> {
        match self.fetcher.fetch_cards(type_filter).await {
            Ok(cards) => cards,
            Err(e) => {
                warn!(error = %e, ?type_filter, "card fetch failed; serving empty list");
                Vec::new()
            }
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> Vec<SearchHit> {
        search::search(&self.cache, self.fetcher.as_ref(), request, &self.settings).await
    }

    pub async fn add_note(&self, name: &str, content: &str) {
        self.notes.add(name, content).await;
    }

    pub async fn notes(&self) -> Vec<Note> {
        self.notes.list().await
    }

    /// Content behind an `arkham://` resource URI.
    pub async fn read_resource(&self, uri: &str) -> ArkhamResult<String> {
        match ResourceUri::parse(uri)? {
            ResourceUri::Scenario(id) => self.get_scenario_detail(&id).await,
            ResourceUri::Note(name) => self
                .notes
                .get(&name)
                .await
                .ok_or_else(|| ArkhamError::NotFound(format!("note '{}'", name))),
        }
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status().await
    }
}

// ============ CLI entry points ============

/// `arkham scenarios`
pub async fn run_list_scenarios(catalog: &Catalog) -> Result<()> {
    let scenarios = catalog.list_scenarios().await;
    if scenarios.is_empty() {
        println!("No scenarios available.");
        return Ok(());
    }

    for s in scenarios.iter() {
        println!("{}  {}", s.id, s.title);
        println!("    {}", s.url);
        if !s.metadata.is_empty() {
            println!("    {}", serde_json::to_string(&s.metadata)?);
        }
    }
    println!();
    println!("{} scenarios", scenarios.len());
    Ok(())
}

/// `arkham scenario <id>`
pub async fn run_get_scenario(catalog: &Catalog, id: &str) -> Result<()> {
    let content = catalog
        .get_scenario_detail(id)
        .await
        .with_context(|| format!("Failed to load scenario '{}'", id))?;
    println!("{}", content);
    Ok(())
}

/// `arkham cards`
pub async fn run_list_cards(catalog: &Catalog, type_filter: Option<&str>) -> Result<()> {
    let cards = catalog.list_cards(type_filter).await;
    if cards.is_empty() {
        println!("No cards available.");
        return Ok(());
    }

    for c in &cards {
        let cost = c.cost.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {} [{}] {} cost={} ({})",
            c.id, c.name, c.card_type, c.faction, cost, c.pack
        );
    }
    println!();
    println!("{} cards", cards.len());
    Ok(())
}
