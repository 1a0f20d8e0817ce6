//! Terminal bar chart.

use crate::models::Summary;

/// Width in characters of the longest bar.
const BAR_WIDTH: usize = 40;

/// Draw one horizontal bar per year, most recent first.
pub fn draw_text_chart(summary: &Summary) -> String {
    let mut output = String::new();

    output.push_str("Releases per year\n");

    if summary.is_empty() {
        output.push_str("  (no data)\n\n");
        return output;
    }

    let max = summary.max_count();
    let count_width = max.to_string().len();

    for bucket in &summary.buckets {
        let len = bar_length(bucket.count, max);
        output.push_str(&format!(
            "  {} | {:>width$} {}\n",
            bucket.year,
            bucket.count,
            "█".repeat(len),
            width = count_width
        ));
    }
    output.push('\n');

    output
}

/// Bars are scaled to the largest count; any non-zero count gets at least one cell.
fn bar_length(count: usize, max: usize) -> usize {
    if max == 0 || count == 0 {
        return 0;
    }
    ((count * BAR_WIDTH) / max).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearCount;

    #[test]
    fn test_draw_text_chart() {
        let summary = Summary {
            buckets: vec![
                YearCount { year: 2023, count: 10 },
                YearCount { year: 2021, count: 5 },
            ],
        };

        let chart = draw_text_chart(&summary);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "Releases per year");
        assert!(lines[1].starts_with("  2023 | 10 "));
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert!(lines[2].starts_with("  2021 |  5 "));
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_empty_summary() {
        let chart = draw_text_chart(&Summary::default());
        assert!(chart.contains("(no data)"));
    }

    #[test]
    fn test_bar_length_minimum() {
        assert_eq!(bar_length(1, 1000), 1);
        assert_eq!(bar_length(0, 10), 0);
    }
}
