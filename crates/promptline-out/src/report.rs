//! Report writers: Markdown and plain-text renderings of a pipeline run.
use promptline_core::{PipelineDef, PipelineOutput};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

/// Pair each stage result with the title of its stage definition.
///
/// Results for keys the definition does not know keep their key as title.
pub fn sections(def: &PipelineDef, output: &PipelineOutput) -> Vec<ReportSection> {
    output
        .iter()
        .map(|result| {
            let title = def
                .stages
                .iter()
                .find(|s| s.key == result.stage_key)
                .map(|s| s.title.clone())
                .unwrap_or_else(|| result.stage_key.clone());
            ReportSection {
                title,
                body: result.text.clone(),
            }
        })
        .collect()
}

/// `# title`, then one `## heading` per section followed by the raw text.
pub fn markdown_report(title: &str, sections: &[ReportSection]) -> String {
    let mut out = format!("# {}\n", title);
    for section in sections {
        out.push_str(&format!("\n## {}\n{}\n", section.title, section.body.trim_end()));
    }
    out
}

/// Extra header blocks for the plain-text report.
#[derive(Debug, Clone, Default)]
pub struct TextReportHeader {
    pub context: Option<String>,
    pub elements: Vec<String>,
}

/// Plain-text report with underlined headings.
pub fn text_report(title: &str, header: &TextReportHeader, sections: &[ReportSection]) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(title.to_uppercase());
    lines.push(format!("{}\n", "=".repeat(20)));

    let mut block = |heading: &str, body: &str| {
        lines.push(heading.to_uppercase());
        lines.push("-".repeat(10));
        lines.push(format!("{}\n", body.trim_end()));
    };

    if let Some(context) = header.context.as_deref().filter(|c| !c.trim().is_empty()) {
        block("Context", context);
    }
    if !header.elements.is_empty() {
        block("Elements analyzed", &header.elements.join(", "));
    }
    for section in sections {
        block(&section.title, &section.body);
    }

    lines.join("\n")
}
