//! Heuristic scenario attribute extraction.
//!
//! Fan-made scenario titles and blurbs often mention a player range
//! ("1-4 players", "2 to 3 players", "solo") or a difficulty ("Difficulty:
//! Hard"). [`extract_metadata`] pulls those out with regular expressions and
//! leaves everything else absent. It never touches the network.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ScenarioMetadata;

// ============================================================================
// Regex Patterns
// ============================================================================

/// "1-4 players", "1–4 players", "2 to 3 players"
static PLAYER_RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        \b(?P<min>\d{1,2})
        \s*(?:-|–|—|to)\s*
        (?P<max>\d{1,2})
        \s*players?\b
        ",
    )
    .expect("Failed to compile player range regex")
});

/// "3+ players"
static PLAYER_MIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?P<min>\d{1,2})\s*\+\s*players?\b")
        .expect("Failed to compile minimum players regex")
});

/// "2 players", "1 player"
static PLAYER_EXACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?P<n>\d{1,2})\s*players?\b")
        .expect("Failed to compile exact players regex")
});

static SOLO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsolo\b").expect("Failed to compile solo regex"));

/// "Difficulty: Hard", "difficulty - expert", "Expert difficulty"
static DIFFICULTY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        \bdifficulty\s*[:\-]?\s*(?P<after>easy|standard|hard|expert)\b
        |
        \b(?P<before>easy|standard|hard|expert)\s+difficulty\b
        ",
    )
    .expect("Failed to compile difficulty regex")
});

/// Extract player counts and difficulty from free text.
///
/// Range forms win over open-ended ("3+") forms, which win over a bare
/// count. A reversed range ("4-1 players") is normalized.
pub fn extract_metadata(text: &str) -> ScenarioMetadata {
    let (min_players, max_players) = extract_players(text);
    ScenarioMetadata {
        min_players,
        max_players,
        difficulty: extract_difficulty(text),
    }
}

fn extract_players(text: &str) -> (Option<u32>, Option<u32>) {
    if let Some(caps) = PLAYER_RANGE_PATTERN.captures(text) {
        let a = caps["min"].parse::<u32>().ok();
        let b = caps["max"].parse::<u32>().ok();
        if let (Some(a), Some(b)) = (a, b) {
            return (Some(a.min(b)), Some(a.max(b)));
        }
    }

    if let Some(caps) = PLAYER_MIN_PATTERN.captures(text) {
        return (caps["min"].parse().ok(), None);
    }

    if let Some(caps) = PLAYER_EXACT_PATTERN.captures(text) {
        let n = caps["n"].parse().ok();
        return (n, n);
    }

    if SOLO_PATTERN.is_match(text) {
        return (Some(1), Some(1));
    }

    (None, None)
}

fn extract_difficulty(text: &str) -> Option<String> {
    let caps = DIFFICULTY_PATTERN.captures(text)?;
    caps.name("after")
        .or_else(|| caps.name("before"))
        .map(|m| m.as_str().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphen_range() {
        let m = extract_metadata("Carnevale of Horrors (1-4 players)");
        assert_eq!(m.min_players, Some(1));
        assert_eq!(m.max_players, Some(4));
    }

    #[test]
    fn test_en_dash_range() {
        let m = extract_metadata("Dark Matter – 2–3 Players");
        assert_eq!(m.min_players, Some(2));
        assert_eq!(m.max_players, Some(3));
    }

    #[test]
    fn test_to_range() {
        let m = extract_metadata("for 1 to 2 players");
        assert_eq!((m.min_players, m.max_players), (Some(1), Some(2)));
    }

    #[test]
    fn test_reversed_range() {
        let m = extract_metadata("4-1 players");
        assert_eq!((m.min_players, m.max_players), (Some(1), Some(4)));
    }

    #[test]
    fn test_open_ended() {
        let m = extract_metadata("Best with 3+ players");
        assert_eq!(m.min_players, Some(3));
        assert_eq!(m.max_players, None);
    }

    #[test]
    fn test_exact_count() {
        let m = extract_metadata("A 2 player campaign");
        assert_eq!((m.min_players, m.max_players), (Some(2), Some(2)));
    }

    #[test]
    fn test_solo() {
        let m = extract_metadata("Solo scenario: The Blob");
        assert_eq!((m.min_players, m.max_players), (Some(1), Some(1)));
    }

    #[test]
    fn test_difficulty_label() {
        let m = extract_metadata("Difficulty: Hard");
        assert_eq!(m.difficulty.as_deref(), Some("hard"));
    }

    #[test]
    fn test_difficulty_suffix() {
        let m = extract_metadata("Played on Expert difficulty, 1-2 players");
        assert_eq!(m.difficulty.as_deref(), Some("expert"));
        assert_eq!((m.min_players, m.max_players), (Some(1), Some(2)));
    }

    #[test]
    fn test_bare_difficulty_word_ignored() {
        let m = extract_metadata("A hard-boiled detective story");
        assert_eq!(m.difficulty, None);
    }

    #[test]
    fn test_nothing_found() {
        let m = extract_metadata("The Dunwich Legacy");
        assert!(m.is_empty());
    }

    #[test]
    fn test_solo_inside_word_ignored() {
        let m = extract_metadata("Consolo Grounds");
        assert!(m.is_empty());
    }
}
