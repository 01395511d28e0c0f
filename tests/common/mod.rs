//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use arkham_horror_mcp::error::{ArkhamError, ArkhamResult};
use arkham_horror_mcp::fetcher::Fetcher;
use arkham_horror_mcp::models::{
    CardRecord, ScenarioMetadata, ScenarioRecord, CARD_SOURCE, SCENARIO_SOURCE,
};
use async_trait::async_trait;

pub fn scenario(id: &str, title: &str) -> ScenarioRecord {
    ScenarioRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("Arkham Horror scenario: {}", title),
        url: format!("https://scenarios.test/index.php/{}/", id),
        source: SCENARIO_SOURCE.to_string(),
        metadata: ScenarioMetadata::default(),
    }
}

pub fn scenario_with_players(id: &str, title: &str, min: u32, max: u32) -> ScenarioRecord {
    let mut record = scenario(id, title);
    record.metadata.min_players = Some(min);
    record.metadata.max_players = Some(max);
    record
}

pub fn card(id: &str, name: &str, card_type: &str, faction: &str) -> CardRecord {
    CardRecord {
        id: id.to_string(),
        name: name.to_string(),
        card_type: card_type.to_string(),
        subtype: String::new(),
        faction: faction.to_string(),
        pack: "Core Set".to_string(),
        text: String::new(),
        cost: Some(1),
        source: CARD_SOURCE.to_string(),
    }
}

/// In-memory [`Fetcher`]. Scenario fetches pop scripted results in order
/// and repeat the last one once the script runs out.
pub struct FakeFetcher {
    scenario_script: Mutex<Vec<ArkhamResult<Vec<ScenarioRecord>>>>,
    cards: Vec<CardRecord>,
    pub scenario_calls: AtomicUsize,
    pub card_calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new(scenarios: Vec<ScenarioRecord>, cards: Vec<CardRecord>) -> Self {
        Self::scripted(vec![Ok(scenarios)], cards)
    }

    pub fn scripted(script: Vec<ArkhamResult<Vec<ScenarioRecord>>>, cards: Vec<CardRecord>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            scenario_script: Mutex::new(script),
            cards,
            scenario_calls: AtomicUsize::new(0),
            card_calls: AtomicUsize::new(0),
        }
    }

    pub fn scenario_calls(&self) -> usize {
        self.scenario_calls.load(Ordering::SeqCst)
    }
}

fn replay(result: &ArkhamResult<Vec<ScenarioRecord>>) -> ArkhamResult<Vec<ScenarioRecord>> {
    match result {
        Ok(records) => Ok(records.clone()),
        Err(e) => Err(ArkhamError::InvalidResponse(e.to_string())),
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_scenarios(&self) -> ArkhamResult<Vec<ScenarioRecord>> {
        self.scenario_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.scenario_script.lock().unwrap();
        if script.len() > 1 {
            script.pop().unwrap()
        } else {
            script.last().map(replay).unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    async fn fetch_scenario_detail(&self, scenario: &ScenarioRecord) -> ArkhamResult<String> {
        Ok(format!("<h1>{}</h1>", scenario.title))
    }

    async fn fetch_cards(&self, type_filter: Option<&str>) -> ArkhamResult<Vec<CardRecord>> {
        self.card_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .cards
            .iter()
            .filter(|c| type_filter.map_or(true, |t| c.card_type.eq_ignore_ascii_case(t)))
            .cloned()
            .collect())
    }
}
