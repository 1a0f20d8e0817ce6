//! Chart rendering.
//!
//! The controller hands each freshly computed `Summary` to a `Renderer`.
//! The bundled renderer draws the summary as terminal bars, an SVG
//! document, or JSON, and rewrites its whole output on every call.

pub mod json;
pub mod svg;
pub mod text;

use crate::models::Summary;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

/// Anything that can draw a summary.
pub trait Renderer {
    /// Replace whatever was drawn before with `summary`.
    fn render(&mut self, summary: &Summary) -> io::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, summary: &Summary) -> io::Result<()> {
        (**self).render(summary)
    }
}

/// Output format of the chart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    /// Horizontal bars in the terminal (default)
    #[default]
    Text,
    /// SVG bar chart document
    Svg,
    /// JSON summary
    Json,
}

/// Size of the drawing surface for formats that have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
        }
    }
}

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    Stdout,
    /// Truncated and rewritten on every render.
    File(PathBuf),
}

impl RenderTarget {
    fn write(&self, content: &str) -> io::Result<()> {
        match self {
            RenderTarget::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                stdout.flush()
            }
            RenderTarget::File(path) => {
                debug!("Writing chart to {}", path.display());
                std::fs::write(path, content)
            }
        }
    }
}

/// Draws summaries in one of the bundled formats.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    format: ChartFormat,
    size: ChartSize,
    target: RenderTarget,
}

impl ChartRenderer {
    pub fn new(format: ChartFormat, size: ChartSize, target: RenderTarget) -> Self {
        Self {
            format,
            size,
            target,
        }
    }

    /// Produce the document for `summary` without writing it.
    pub fn draw(&self, summary: &Summary) -> io::Result<String> {
        match self.format {
            ChartFormat::Text => Ok(text::draw_text_chart(summary)),
            ChartFormat::Svg => Ok(svg::draw_svg_chart(summary, self.size)),
            ChartFormat::Json => json::draw_json_summary(summary),
        }
    }
}

impl Renderer for ChartRenderer {
    fn render(&mut self, summary: &Summary) -> io::Result<()> {
        let document = self.draw(summary)?;
        self.target.write(&document)
    }
}
