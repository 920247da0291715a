//! Language breakdown types and computation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry of a repository's language breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStat {
    /// Language name as reported by the host (e.g., "Rust").
    pub name: String,
    /// Bytes of code attributed to this language.
    pub bytes: i64,
    /// Share of the total byte count, rounded to the nearest integer percent.
    pub percentage: i32,
}

/// Build the ordered language breakdown from the host's language→bytes map.
///
/// Entries are ordered by byte count descending (ties broken by name so the
/// result is deterministic). Percentages are `round(bytes / total * 100)`.
/// Zero- and negative-byte entries are dropped; an empty or all-zero map
/// yields an empty breakdown.
pub fn language_breakdown(bytes_by_language: &HashMap<String, i64>) -> Vec<LanguageStat> {
    let total: i64 = bytes_by_language.values().filter(|b| **b > 0).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut stats: Vec<LanguageStat> = bytes_by_language
        .iter()
        .filter(|(_, bytes)| **bytes > 0)
        .map(|(name, bytes)| LanguageStat {
            name: name.clone(),
            bytes: *bytes,
            percentage: ((*bytes as f64 / total as f64) * 100.0).round() as i32,
        })
        .collect();

    stats.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
    stats
}
