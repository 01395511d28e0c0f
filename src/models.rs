//! Core data models shared by the fetcher, cache, search engine and servers.
//!
//! Records serialize to the same JSON shape on every surface (REST, tool
//! results, MCP), so field names here are part of the
//! public contract.

use serde::{Deserialize, Serialize};

/// Source tag stamped on every scraped scenario.
pub const SCENARIO_SOURCE: &str = "arkhamcentral";

/// Source tag stamped on every card from the card database.
pub const CARD_SOURCE: &str = "arkhamdb";

/// A fan-made scenario scraped from the scenario listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Slug derived from the last path segment of `url`.
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub metadata: ScenarioMetadata,
}

/// Heuristically extracted scenario attributes. Every key may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_players: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl ScenarioMetadata {
    pub fn is_empty(&self) -> bool {
        self.min_players.is_none() && self.max_players.is_none() && self.difficulty.is_none()
    }
}

/// A player card or investigator from the card database. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub subtype: String,
    pub faction: String,
    pub pack: String,
    pub text: String,
    pub cost: Option<i64>,
    pub source: String,
}

/// A record plus the fuzzy similarity score it was matched with, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Error-shaped search result, returned in place of records so list-shaped
/// callers always receive a uniform element type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
}

/// One element of a search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchHit {
    Scenario(Scored<ScenarioRecord>),
    Card(Scored<CardRecord>),
    Error(ErrorRecord),
}

impl SearchHit {
    pub fn error(message: impl Into<String>) -> Self {
        SearchHit::Error(ErrorRecord {
            error: message.into(),
        })
    }

    pub fn similarity(&self) -> Option<f64> {
        match self {
            SearchHit::Scenario(s) => s.similarity,
            SearchHit::Card(c) => c.similarity,
            SearchHit::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SearchHit::Error(_))
    }
}
