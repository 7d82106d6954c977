//! Report Documents
//!
//! Assembles the combined batch report and renders single-package documents.

use chrono::{DateTime, Local};

use crate::constants::report as report_constants;
use crate::research::ResearchResult;

/// One package's analysis, split out of a combined report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDocument {
    /// Package key (name, or id when the name is blank)
    pub key: String,
    /// Section text, starting with the package's section marker line
    pub body: String,
}

impl AnalysisDocument {
    pub fn new(key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
        }
    }

    /// Full text written to disk: fixed report header followed by the section
    pub fn render(&self) -> String {
        format!("{}\n\n{}\n", report_constants::HEADER_TITLE, self.body.trim_end())
    }
}

/// Marker line opening the section for `key`
pub fn section_marker(key: &str) -> String {
    format!("{}{}", report_constants::SECTION_MARKER, key)
}

/// Build the combined report for a batch
///
/// Results without analysis text (no provider configured) get no section.
pub fn assemble(results: &[ResearchResult], generated_at: DateTime<Local>) -> String {
    let sections: Vec<&ResearchResult> = results.iter().filter(|r| r.has_content()).collect();

    let mut out = String::new();
    out.push_str(report_constants::HEADER_TITLE);
    out.push_str("\n\n");
    out.push_str(&format!(
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Packages analyzed: {}\n\n", sections.len()));

    for result in sections {
        let package = &result.package;
        out.push_str(&section_marker(result.key()));
        out.push_str("\n\n### Package Information\n\n");
        out.push_str(&format!("- **ID**: {}\n", package.id));
        out.push_str(&format!("- **Current Version**: {}\n", package.current_version));
        out.push_str(&format!(
            "- **Available Version**: {}\n",
            package.available_version
        ));
        out.push_str(&format!("- **Source**: {}\n", package.source));
        out.push_str(&format!("- **Status**: {}\n\n", package.status));
        out.push_str("### Analysis\n\n");
        out.push_str(&escape_markers(result.analysis.trim()));
        out.push_str("\n\n");
        out.push_str(report_constants::SECTION_RULE);
        out.push_str("\n\n");
    }

    out
}

/// Escape analysis lines that would otherwise read as a section marker
fn escape_markers(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.starts_with(report_constants::SECTION_MARKER) {
                format!("\\{}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
