//! In-memory notes behind the `add-note` tool and `summarize-notes` prompt.
//!
//! Notes live for the lifetime of the process and are ordered by name.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct NoteStore {
    notes: RwLock<BTreeMap<String, String>>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a note.
    pub async fn add(&self, name: &str, content: &str) {
        self.notes
            .write()
            .await
            .insert(name.to_string(), content.to_string());
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        self.notes.read().await.get(name).cloned()
    }

    pub async fn list(&self) -> Vec<Note> {
        self.notes
            .read()
            .await
            .iter()
            .map(|(name, content)| Note {
                name: name.clone(),
                content: content.clone(),
            })
            .collect()
    }
}

/// Summary style for the `summarize-notes` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStyle {
    #[default]
    Brief,
    Detailed,
}

impl SummaryStyle {
    /// `"detailed"` selects [`SummaryStyle::Detailed`]; anything else is brief.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("detailed") => SummaryStyle::Detailed,
            _ => SummaryStyle::Brief,
        }
    }
}

/// Prompt text asking for a summary of `notes`.
pub fn summary_prompt(notes: &[Note], style: SummaryStyle) -> String {
    let detail = match style {
        SummaryStyle::Detailed => " Give extensive details.",
        SummaryStyle::Brief => "",
    };
    let lines: Vec<String> = notes
        .iter()
        .map(|n| format!("- {}: {}", n.name, n.content))
        .collect();
    format!(
        "Here are the current notes to summarize:{}\n\n{}",
        detail,
        lines.join("\n")
    )
}
