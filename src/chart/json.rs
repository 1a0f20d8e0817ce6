//! JSON summary output.

use crate::models::Summary;
use std::io;

/// Serialize the summary as pretty JSON.
pub fn draw_json_summary(summary: &Summary) -> io::Result<String> {
    let mut json = serde_json::to_string_pretty(summary).map_err(io::Error::from)?;
    json.push('\n');
    Ok(json)
}
