use crate::material::MaterialRecord;
use std::collections::HashMap;

/// Callers ask for suggestions when a search yields fewer results than this.
pub const SUGGESTION_THRESHOLD: usize = 5;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;
/// Only the first materials are scanned, keeping suggestions cheap on large catalogs.
pub const MAX_SCANNED_MATERIALS: usize = 100;
const MIN_TOKEN_CHARS: usize = 4;

pub fn needs_suggestions(result_count: usize) -> bool { result_count < SUGGESTION_THRESHOLD }

/// Related two-word phrases from the catalog, most frequent first. Falls back to fixed
/// query templates when the catalog has nothing to offer.
pub fn generate_suggestions(query: &str, materials: &[MaterialRecord], max_suggestions: usize) -> Vec<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() || max_suggestions == 0 {
        return Vec::new();
    }
    let tokens: Vec<&str> = query
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    for material in materials.iter().take(MAX_SCANNED_MATERIALS) {
        let text = format!("{} {} {}", material.title, material.description, material.subject_name).to_lowercase();
        let words: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
            .collect();
        for token in tokens.iter().filter(|t| text.contains(**t)) {
            for pair in words.windows(2) {
                if !(pair[0].contains(token) || pair[1].contains(token)) { continue; }
                let bigram = format!("{} {}", pair[0], pair[1]);
                if bigram == query { continue; }
                let count = counts.entry(bigram.clone()).or_insert(0);
                if *count == 0 { first_seen.push(bigram); }
                *count += 1;
            }
        }
    }

    if first_seen.is_empty() {
        return fallback_suggestions(&query, max_suggestions);
    }
    let mut ranked: Vec<(String, usize)> = first_seen
        .into_iter()
        .map(|b| {
            let c = counts[&b];
            (b, c)
        })
        .collect();
    // stable: equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(max_suggestions).map(|(b, _)| b).collect()
}

fn fallback_suggestions(query: &str, max_suggestions: usize) -> Vec<String> {
    vec![
        format!("{query} lectures"),
        format!("{query} practice"),
        format!("{query} examples"),
        format!("{query} for beginners"),
        format!("study materials on {query}"),
    ]
    .into_iter()
    .take(max_suggestions)
    .collect()
}
