//! SVG bar chart.
//!
//! Years run along a band scale on the x axis, counts along a linear y axis
//! starting at zero. The document is self-contained and rebuilt from scratch
//! on every render.

use super::ChartSize;
use crate::models::Summary;
use std::fmt::Write;

const MARGIN_TOP: f64 = 20.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 30.0;
const MARGIN_LEFT: f64 = 50.0;

/// Fraction of each band left empty between bars.
const BAND_PADDING: f64 = 0.1;

/// Target number of y axis ticks.
const Y_TICKS: usize = 5;

/// Positions of the bars along the x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BandScale {
    step: f64,
    bandwidth: f64,
    offset: f64,
}

impl BandScale {
    /// Spread `n` bands across `range` with equal inner and outer padding.
    fn new(n: usize, range: f64) -> Self {
        let step = range / (n as f64 - BAND_PADDING + 2.0 * BAND_PADDING).max(1.0);
        Self {
            step,
            bandwidth: step * (1.0 - BAND_PADDING),
            offset: (range - step * (n as f64 - BAND_PADDING)) / 2.0,
        }
    }

    fn x(&self, index: usize) -> f64 {
        self.offset + self.step * index as f64
    }
}

/// Draw the summary as an SVG document.
pub fn draw_svg_chart(summary: &Summary, size: ChartSize) -> String {
    let width = (size.width as f64 - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let height = (size.height as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);

    let bands = BandScale::new(summary.buckets.len(), width);
    let max = summary.max_count();
    let ticks = y_ticks(max);
    let y_max = ticks.last().copied().unwrap_or(0).max(1) as f64;
    let y = |count: usize| height - (count as f64 / y_max) * height;

    let mut svg = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        size.width, size.height
    );
    let _ = writeln!(
        svg,
        r#"  <g transform="translate({},{})">"#,
        MARGIN_LEFT, MARGIN_TOP
    );

    // x axis
    let _ = writeln!(
        svg,
        r#"    <g class="x-axis" transform="translate(0,{:.1})">"#,
        height
    );
    let _ = writeln!(
        svg,
        r#"      <line x1="0" y1="0" x2="{:.1}" y2="0" stroke="currentColor"/>"#,
        width
    );
    for (i, bucket) in summary.buckets.iter().enumerate() {
        let center = bands.x(i) + bands.bandwidth / 2.0;
        let _ = writeln!(
            svg,
            r#"      <text x="{:.1}" y="18" text-anchor="middle" font-size="10">{}</text>"#,
            center, bucket.year
        );
    }
    svg.push_str("    </g>\n");

    // y axis
    svg.push_str("    <g class=\"y-axis\">\n");
    let _ = writeln!(
        svg,
        r#"      <line x1="0" y1="0" x2="0" y2="{:.1}" stroke="currentColor"/>"#,
        height
    );
    for tick in &ticks {
        let _ = writeln!(
            svg,
            r#"      <text x="-6" y="{:.1}" text-anchor="end" dominant-baseline="middle" font-size="10">{}</text>"#,
            y(*tick),
            tick
        );
    }
    svg.push_str("    </g>\n");

    for (i, bucket) in summary.buckets.iter().enumerate() {
        let top = y(bucket.count);
        let _ = writeln!(
            svg,
            r#"    <rect class="bar" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="steelblue"><title>{}: {}</title></rect>"#,
            bands.x(i),
            top,
            bands.bandwidth,
            height - top,
            bucket.year,
            bucket.count
        );
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}

/// Integer tick values from zero covering `max`.
fn y_ticks(max: usize) -> Vec<usize> {
    if max == 0 {
        return vec![0];
    }

    let step = max.div_ceil(Y_TICKS).max(1);
    (0..=max.div_ceil(step)).map(|i| i * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearCount;

    fn summary() -> Summary {
        Summary {
            buckets: vec![
                YearCount { year: 2023, count: 4 },
                YearCount { year: 2022, count: 2 },
            ],
        }
    }

    #[test]
    fn test_band_scale_spans_range() {
        let bands = BandScale::new(5, 510.0);

        // Outer padding mirrors inner padding, so the first bar starts one
        // padding step in and the last one ends one padding step short.
        assert!((bands.x(0) - bands.step * BAND_PADDING).abs() < 1e-9);
        let end = bands.x(4) + bands.bandwidth;
        assert!((510.0 - end - bands.step * BAND_PADDING).abs() < 1e-9);
    }

    #[test]
    fn test_y_ticks() {
        assert_eq!(y_ticks(0), vec![0]);
        assert_eq!(y_ticks(4), vec![0, 1, 2, 3, 4]);
        assert_eq!(y_ticks(10), vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(y_ticks(11), vec![0, 3, 6, 9, 12]);
    }

    #[test]
    fn test_draw_svg_chart() {
        let svg = draw_svg_chart(&summary(), ChartSize::default());

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="600" height="400">"#));
        assert_eq!(svg.matches(r#"class="bar""#).count(), 2);
        assert!(svg.contains(">2023</text>"));
        assert!(svg.contains("<title>2022: 2</title>"));
        // Tallest bar fills the plot height.
        assert!(svg.contains(r#"y="0.0" width="#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_draw_empty_chart_has_no_bars() {
        let svg = draw_svg_chart(&Summary::default(), ChartSize::default());
        assert!(!svg.contains("class=\"bar\""));
        assert!(svg.contains("class=\"x-axis\""));
    }
}
