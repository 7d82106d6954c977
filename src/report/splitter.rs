//! Report Splitter
//!
//! Cuts a combined report back into one document per package section.

use tracing::{debug, trace};

use super::document::AnalysisDocument;
use crate::constants::report as report_constants;
use crate::types::PackageRecord;

/// Split a combined report on section markers
///
/// Lines before the first marker are dropped. Each marker label is resolved
/// against `known` (by name, then id) so the document key matches the
/// package's report key; unknown labels are kept as written.
pub fn split(combined: &str, known: &[PackageRecord]) -> Vec<AnalysisDocument> {
    let mut documents = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in combined.lines() {
        if let Some(label) = line.strip_prefix(report_constants::SECTION_MARKER) {
            if let Some((key, lines)) = current.take() {
                documents.push(finish(key, &lines));
            }
            let key = resolve_key(label.trim(), known);
            trace!("Report section started: {}", key);
            current = Some((key, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((key, lines)) = current {
        documents.push(finish(key, &lines));
    }

    debug!("Split report into {} documents", documents.len());
    documents
}

fn resolve_key(label: &str, known: &[PackageRecord]) -> String {
    known
        .iter()
        .find(|p| p.name == label)
        .or_else(|| known.iter().find(|p| p.matches(label)))
        .map(|p| p.report_key().to_string())
        .unwrap_or_else(|| label.to_string())
}

/// Join section lines, dropping the trailing rule and blank lines
fn finish(key: String, lines: &[&str]) -> AnalysisDocument {
    let mut end = lines.len();
    while end > 1 {
        let last = lines[end - 1].trim();
        if last.is_empty() || last == report_constants::SECTION_RULE {
            end -= 1;
        } else {
            break;
        }
    }

    let mut body = lines[..end].join("\n");
    body.push('\n');
    AnalysisDocument::new(key, body)
}
