//! Derived views over fetched records.
//!
//! Filtering by genre and bucketing by year. Both are pure; the controller
//! recomputes them on every render.

pub mod aggregator;
pub mod filter;

pub use aggregator::*;
pub use filter::*;
