//! Search and filter pipeline.
//!
//! Scenarios come from the [`ScenarioCache`]; cards and investigators are
//! fetched live on every request. Each branch applies a name filter
//! (case-insensitive substring, or fuzzy similarity with a threshold), its
//! attribute filters, an optional ranking by similarity, and finally a
//! silent truncation to `search.max_results`.
//!
//! Request-shape problems never raise: an unknown kind, or a card source
//! with nothing to offer, becomes a single [`SearchHit::Error`] record so
//! list-shaped callers always get a list.

use std::cmp::Ordering;

use anyhow::Result;
use serde::{de, Deserialize, Deserializer};
use tracing::warn;

use crate::cache::ScenarioCache;
use crate::catalog::Catalog;
use crate::config::SearchConfig;
use crate::fetcher::Fetcher;
use crate::models::{CardRecord, ScenarioRecord, Scored, SearchHit};
use crate::similarity::{ratio, round2};

/// What a search runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKind {
    Scenario,
    Card,
    Investigator,
    Unknown(String),
}

impl SearchKind {
    /// Case-insensitive; unknown kinds keep the caller's spelling.
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_lowercase().as_str() {
            "scenario" => SearchKind::Scenario,
            "card" => SearchKind::Card,
            "investigator" => SearchKind::Investigator,
            _ => SearchKind::Unknown(kind.to_string()),
        }
    }
}

/// Parameters accepted by every search surface (query string, tool
/// arguments, CLI flags).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min_players: Option<u32>,
    #[serde(default)]
    pub max_players: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub fuzzy: bool,
    #[serde(default)]
    pub min_similarity: Option<f64>,
    #[serde(default)]
    pub faction: Option<String>,
}

impl SearchRequest {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    fn name_query(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// A boolean that also accepts the query-string spellings `1`/`0`,
/// `yes`/`no` and `on`/`off`.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"a boolean (true/false/1/0)",
            )),
        },
    }
}

/// Name matcher shared by all branches.
struct NameFilter {
    query: Option<String>,
    fuzzy: bool,
    min_similarity: f64,
}

impl NameFilter {
    fn new(request: &SearchRequest, default_min_similarity: f64) -> Self {
        Self {
            query: request.name_query().map(str::to_string),
            fuzzy: request.fuzzy,
            min_similarity: request.min_similarity.unwrap_or(default_min_similarity),
        }
    }

    /// Whether results get a similarity score and should be ranked by it.
    fn ranks(&self) -> bool {
        self.fuzzy && self.query.is_some()
    }

    /// `None` drops the record; `Some(score)` keeps it.
    fn check(&self, candidate: &str) -> Option<Option<f64>> {
        let Some(query) = &self.query else {
            return Some(None);
        };

        if self.fuzzy {
            let score = ratio(query, candidate);
            (score >= self.min_similarity).then_some(Some(round2(score)))
        } else {
            candidate
                .to_lowercase()
                .contains(&query.to_lowercase())
                .then_some(None)
        }
    }
}

/// Scenario branch over an already loaded list.
pub fn filter_scenarios(
    records: &[ScenarioRecord],
    request: &SearchRequest,
    default_min_similarity: f64,
) -> Vec<Scored<ScenarioRecord>> {
    let names = NameFilter::new(request, default_min_similarity);
    let difficulty = request.difficulty.as_deref().map(str::to_lowercase);

    let mut hits: Vec<Scored<ScenarioRecord>> = records
        .iter()
        .filter_map(|r| {
            names.check(&r.title).map(|similarity| Scored {
                record: r.clone(),
                similarity,
            })
        })
        .filter(|s| match request.min_players {
            Some(bound) => s.record.metadata.min_players.is_some_and(|v| v >= bound),
            None => true,
        })
        .filter(|s| match request.max_players {
            Some(bound) => s.record.metadata.max_players.is_some_and(|v| v <= bound),
            None => true,
        })
        .filter(|s| match &difficulty {
            Some(wanted) => s
                .record
                .metadata
                .difficulty
                .as_deref()
                .is_some_and(|d| d.to_lowercase() == *wanted),
            None => true,
        })
        .collect();

    if names.ranks() {
        sort_by_similarity(&mut hits, |s| s.similarity);
    }
    hits
}

/// Card / investigator branch over an already fetched list.
pub fn filter_cards(
    cards: Vec<CardRecord>,
    request: &SearchRequest,
    default_min_similarity: f64,
) -> Vec<Scored<CardRecord>> {
    let names = NameFilter::new(request, default_min_similarity);
    let faction = request
        .faction
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase);

    let mut hits: Vec<Scored<CardRecord>> = cards
        .into_iter()
        .filter_map(|c| {
            names
                .check(&c.name)
                .map(|similarity| Scored { record: c, similarity })
        })
        .filter(|s| match &faction {
            Some(wanted) => s.record.faction.to_lowercase().contains(wanted.as_str()),
            None => true,
        })
        .collect();

    if names.ranks() {
        sort_by_similarity(&mut hits, |s| s.similarity);
    }
    hits
}

/// Stable descending sort; ties keep their original order.
fn sort_by_similarity<T>(hits: &mut [T], score: impl Fn(&T) -> Option<f64>) {
    hits.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(Ordering::Equal)
    });
}

/// Run a search end to end.
pub async fn search(
    cache: &ScenarioCache,
    fetcher: &dyn Fetcher,
    request: &SearchRequest,
    settings: &SearchConfig,
) -> Vec<SearchHit> {
    let min_similarity = settings.default_min_similarity;

    let mut hits: Vec<SearchHit> = match SearchKind::parse(&request.kind) {
        SearchKind::Scenario => {
            let scenarios = cache.get_scenarios().await;
            filter_scenarios(&scenarios, request, min_similarity)
                .into_iter()
                .map(SearchHit::Scenario)
                .collect()
        }
        kind @ (SearchKind::Card | SearchKind::Investigator) => {
            let (type_filter, label) = match kind {
                SearchKind::Investigator => (Some("investigator"), "Investigator"),
                _ => (None, "Card"),
            };
            let cards = match fetcher.fetch_cards(type_filter).await {
                Ok(cards) => cards,
                Err(e) => {
                    warn!(error = %e, "card fetch failed during search");
                    Vec::new()
                }
            };
            if cards.is_empty() {
                vec![SearchHit::error(format!(
                    "{} data is currently unavailable from the card database.",
                    label
                ))]
            } else {
                filter_cards(cards, request, min_similarity)
                    .into_iter()
                    .map(SearchHit::Card)
                    .collect()
            }
        }
        SearchKind::Unknown(kind) => vec![SearchHit::error(format!("Unknown type: {}", kind))],
    };

    hits.truncate(settings.max_results);
    hits
}

/// CLI entry point for `arkham search`.
pub async fn run_search(catalog: &Catalog, request: &SearchRequest) -> Result<()> {
    let hits = catalog.search(request).await;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        match hit {
            SearchHit::Scenario(s) => {
                print!("{}. [scenario] {} ({})", i + 1, s.record.title, s.record.id);
                print_score(s.similarity);
                println!("    {}", s.record.url);
            }
            SearchHit::Card(c) => {
                print!(
                    "{}. [{}] {} - {} ({})",
                    i + 1,
                    c.record.card_type,
                    c.record.name,
                    c.record.faction,
                    c.record.id
                );
                print_score(c.similarity);
                println!("    {}", c.record.pack);
            }
            SearchHit::Error(e) => println!("error: {}", e.error),
        }
    }

    Ok(())
}

fn print_score(similarity: Option<f64>) {
    match similarity {
        Some(score) => println!("  score={:.2}", score),
        None => println!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScenarioMetadata;

    fn scenario(id: &str, title: &str, min: Option<u32>, max: Option<u32>, difficulty: Option<&str>) -> ScenarioRecord {
        ScenarioRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("Arkham Horror scenario: {}", title),
            url: format!("https://example.com/index.php/{}/", id),
            source: "arkhamcentral".to_string(),
            metadata: ScenarioMetadata {
                min_players: min,
                max_players: max,
                difficulty: difficulty.map(str::to_string),
            },
        }
    }

    fn card(id: &str, name: &str, faction: &str) -> CardRecord {
        CardRecord {
            id: id.to_string(),
            name: name.to_string(),
            card_type: "Asset".to_string(),
            subtype: String::new(),
            faction: faction.to_string(),
            pack: "Core Set".to_string(),
            text: String::new(),
            cost: Some(3),
            source: "arkhamdb".to_string(),
        }
    }

    fn library() -> Vec<ScenarioRecord> {
        vec![
            scenario("blob", "The Blob That Ate Everything", Some(1), Some(4), Some("Standard")),
            scenario("arkham-nights", "Arkham Nights", Some(2), Some(4), Some("hard")),
            scenario("dark-arkham", "Dark ARKHAM", Some(1), None, None),
            scenario("solo", "Solo Hunt", Some(1), Some(1), Some("Expert")),
            scenario("bare", "Midnight Masks", None, None, None),
        ]
    }

    fn ids(hits: &[Scored<ScenarioRecord>]) -> Vec<&str> {
        hits.iter().map(|h| h.record.id.as_str()).collect()
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(SearchKind::parse("Scenario"), SearchKind::Scenario);
        assert_eq!(SearchKind::parse(" card "), SearchKind::Card);
        assert_eq!(SearchKind::parse("investigator"), SearchKind::Investigator);
        assert_eq!(SearchKind::parse("Widget"), SearchKind::Unknown("Widget".to_string()));
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let lib = library();
        let mut upper = SearchRequest::new("scenario");
        upper.name = Some("ARKHAM".to_string());
        let mut lower = SearchRequest::new("scenario");
        lower.name = Some("arkham".to_string());

        let a = filter_scenarios(&lib, &upper, 0.6);
        let b = filter_scenarios(&lib, &lower, 0.6);
        assert_eq!(ids(&a), vec!["arkham-nights", "dark-arkham"]);
        assert_eq!(a, b);
        assert!(a.iter().all(|h| h.similarity.is_none()));
    }

    #[test]
    fn test_empty_name_disables_filter() {
        let lib = library();
        let mut req = SearchRequest::new("scenario");
        req.name = Some(String::new());
        req.fuzzy = true;
        let hits = filter_scenarios(&lib, &req, 0.6);
        assert_eq!(hits.len(), lib.len());
        assert!(hits.iter().all(|h| h.similarity.is_none()));
    }

    #[test]
    fn test_fuzzy_exact_threshold() {
        let lib = library();
        let mut req = SearchRequest::new("scenario");
        req.name = Some("arkham nights".to_string());
        req.fuzzy = true;
        req.min_similarity = Some(1.0);
        let hits = filter_scenarios(&lib, &req, 0.6);
        assert_eq!(ids(&hits), vec!["arkham-nights"]);
        assert_eq!(hits[0].similarity, Some(1.0));
    }

    #[test]
    fn test_fuzzy_zero_threshold_keeps_all_ranked() {
        let lib = library();
        let mut req = SearchRequest::new("scenario");
        req.name = Some("Solo Hunt".to_string());
        req.fuzzy = true;
        req.min_similarity = Some(0.0);
        let hits = filter_scenarios(&lib, &req, 0.6);
        assert_eq!(hits.len(), lib.len());
        assert_eq!(hits[0].record.id, "solo");
        let scores: Vec<f64> = hits.iter().map(|h| h.similarity.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_fuzzy_uses_default_threshold() {
        let lib = library();
        let mut req = SearchRequest::new("scenario");
        req.name = Some("Midnight Mask".to_string());
        req.fuzzy = true;
        let hits = filter_scenarios(&lib, &req, 0.6);
        assert_eq!(ids(&hits), vec!["bare"]);
        assert_eq!(hits[0].similarity, Some(0.96));
    }

    #[test]
    fn test_fuzzy_ties_keep_order() {
        let lib = vec![
            scenario("first", "Twin", None, None, None),
            scenario("second", "twin", None, None, None),
        ];
        let mut req = SearchRequest::new("scenario");
        req.name = Some("twin".to_string());
        req.fuzzy = true;
        let hits = filter_scenarios(&lib, &req, 0.6);
        assert_eq!(ids(&hits), vec!["first", "second"]);
    }

    #[test]
    fn test_player_bounds_exclude_missing_keys() {
        let lib = library();
        let mut req = SearchRequest::new("scenario");
        req.min_players = Some(2);
        req.max_players = Some(4);
        let hits = filter_scenarios(&lib, &req, 0.6);
        assert_eq!(ids(&hits), vec!["arkham-nights"]);
    }

    #[test]
    fn test_max_players_only() {
        let lib = library();
        let mut req = SearchRequest::new("scenario");
        req.max_players = Some(1);
        let hits = filter_scenarios(&lib, &req, 0.6);
        assert_eq!(ids(&hits), vec!["solo"]);
    }

    #[test]
    fn test_difficulty_exact_case_insensitive() {
        let lib = library();
        let mut req = SearchRequest::new("scenario");
        req.difficulty = Some("STANDARD".to_string());
        assert_eq!(ids(&filter_scenarios(&lib, &req, 0.6)), vec!["blob"]);

        req.difficulty = Some("stand".to_string());
        assert!(filter_scenarios(&lib, &req, 0.6).is_empty());
    }

    #[test]
    fn test_card_faction_substring() {
        let cards = vec![
            card("1", "Shotgun", "Guardian"),
            card("2", "Lockpicks", "Rogue"),
            card("3", "Guard Dog", "Guardian"),
        ];
        let mut req = SearchRequest::new("card");
        req.faction = Some("guard".to_string());
        let hits = filter_cards(cards, &req, 0.6);
        let names: Vec<&str> = hits.iter().map(|h| h.record.name.as_str()).collect();
        assert_eq!(names, vec!["Shotgun", "Guard Dog"]);
    }

    #[test]
    fn test_card_fuzzy_ranked() {
        let cards = vec![
            card("1", "Lightning Gun", "Guardian"),
            card("2", "Shotgun", "Guardian"),
            card("3", "Flashlight", "Neutral"),
        ];
        let mut req = SearchRequest::new("card");
        req.name = Some("shotgun".to_string());
        req.fuzzy = true;
        req.min_similarity = Some(0.4);
        let hits = filter_cards(cards, &req, 0.6);
        assert_eq!(hits[0].record.name, "Shotgun");
        assert_eq!(hits[0].similarity, Some(1.0));
        assert!(hits.iter().all(|h| h.record.name != "Flashlight"));
    }

    #[test]
    fn test_request_deserializes_from_tool_arguments() {
        let req: SearchRequest = serde_json::from_value(serde_json::json!({
            "type": "scenario",
            "name": "blob",
            "fuzzy": true,
            "min_players": 2
        }))
        .unwrap();
        assert_eq!(req.kind, "scenario");
        assert!(req.fuzzy);
        assert_eq!(req.min_players, Some(2));
        assert_eq!(req.max_players, None);
    }

    #[test]
    fn test_fuzzy_flag_accepts_query_spellings() {
        for (raw, expected) in [("1", true), ("on", true), ("TRUE", true), ("0", false), ("no", false)] {
            let req: SearchRequest =
                serde_json::from_value(serde_json::json!({ "type": "card", "fuzzy": raw })).unwrap();
            assert_eq!(req.fuzzy, expected, "{}", raw);
        }

        let req: SearchRequest = serde_json::from_value(serde_json::json!({ "type": "card" })).unwrap();
        assert!(!req.fuzzy);

        let err = serde_json::from_value::<SearchRequest>(serde_json::json!({ "type": "card", "fuzzy": "maybe" }));
        assert!(err.is_err());
    }
}
