//! Year aggregation.
//!
//! Turns a record collection into the per-year counts that get charted.

use crate::models::{Record, Summary, YearCount};
use std::collections::HashMap;
use tracing::debug;

/// Default number of years kept in a summary.
pub const DEFAULT_TOP_YEARS: usize = 5;

/// Count records per release year and keep the `limit` most recent years.
///
/// Years outside the window are dropped, not merged. Records without a
/// parseable release date are skipped. Fewer distinct years than `limit`
/// yields a shorter summary.
pub fn aggregate_by_year<'a, I>(records: I, limit: usize) -> Summary
where
    I: IntoIterator<Item = &'a Record>,
{
    let counts = count_by_year(records);

    let mut years: Vec<i32> = counts.keys().copied().collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.truncate(limit);

    Summary {
        buckets: years
            .into_iter()
            .map(|year| YearCount {
                year,
                count: counts[&year],
            })
            .collect(),
    }
}

/// Count records per release year.
pub fn count_by_year<'a, I>(records: I) -> HashMap<i32, usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts: HashMap<i32, usize> = HashMap::new();
    let mut undated = 0usize;

    for record in records {
        match record.year() {
            Some(year) => *counts.entry(year).or_default() += 1,
            None => undated += 1,
        }
    }

    if undated > 0 {
        debug!("Skipped {} records without a usable release date", undated);
    }

    counts
}
