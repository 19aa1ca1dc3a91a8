//! Promptline Out: prompt templates and report writers
//!
//! This crate provides the rendering layer on both sides of a pipeline:
//! handlebars prompt templates going in, and Markdown/plain-text/CSV
//! reports coming out.
//!
//! # Example
//!
//! ```ignore
//! use promptline_out::{markdown_report, sections, TemplateRenderer};
//!
//! let renderer = TemplateRenderer::builtin()?;
//! let run = runner.run(&input, &NoProgress).await?;
//! let report = markdown_report("Instagram Analysis", &sections(&def, &run.output));
//! ```

pub mod csv;
pub mod renderer;
pub mod report;
pub mod table;
pub mod templates;

pub use csv::{records_to_csv, write_rows};
pub use renderer::TemplateRenderer;
pub use report::{markdown_report, sections, text_report, ReportSection, TextReportHeader};
pub use table::{parse_markdown_table, MarkdownTable};
pub use templates::{TemplatesFile, BUILTIN_PROMPTS};

use thiserror::Error;

/// Errors that can occur while loading templates or writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Render failed: {0}")]
    Render(String),
}
