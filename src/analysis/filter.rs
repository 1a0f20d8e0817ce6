//! Genre filtering.

use crate::models::{FilterSelection, Record};
use std::collections::HashSet;

/// Select the records matching `selection`, preserving input order.
pub fn filter_records<'a>(records: &'a [Record], selection: &FilterSelection) -> Vec<&'a Record> {
    match selection {
        FilterSelection::All => records.iter().collect(),
        FilterSelection::Genre(genre) => records.iter().filter(|r| r.has_genre(genre)).collect(),
    }
}

/// Every genre label seen across `records`, once each, in first-seen order.
pub fn distinct_genres(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut genres = Vec::new();

    for genre in records.iter().flat_map(|r| &r.genres) {
        if seen.insert(genre.as_str()) {
            genres.push(genre.clone());
        }
    }

    genres
}
