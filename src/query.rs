//! Read-only filters over a loaded snapshot of the store.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::StoredTune;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookStat {
    pub book: i64,
    pub tunes: usize,
}

pub fn by_book(tunes: &[StoredTune], book: i64) -> Vec<&StoredTune> {
    tunes.iter().filter(|t| t.tune.book == Some(book)).collect()
}

/// Tunes whose rhythm equals `label`, ignoring case. Tunes without a rhythm
/// never match.
pub fn by_type<'a>(tunes: &'a [StoredTune], label: &str) -> Vec<&'a StoredTune> {
    let label = label.to_lowercase();

    tunes
        .iter()
        .filter(|t| match &t.tune.rhythm {
            Some(rhythm) => rhythm.to_lowercase() == label,
            None => false,
        })
        .collect()
}

/// Tunes whose title contains `term`, ignoring case. A missing title counts
/// as empty.
pub fn search<'a>(tunes: &'a [StoredTune], term: &str) -> Vec<&'a StoredTune> {
    let term = term.to_lowercase();

    tunes
        .iter()
        .filter(|t| {
            t.tune
                .title
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(&term)
        })
        .collect()
}

/// Tune count per book, ascending by book. Tunes without a book are not
/// counted.
pub fn stats_by_book(tunes: &[StoredTune]) -> Vec<BookStat> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();

    for book in tunes.iter().filter_map(|t| t.tune.book) {
        *counts.entry(book).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(book, tunes)| BookStat { book, tunes })
        .collect()
}
