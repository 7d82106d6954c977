use console::style;

use crate::types::PackageRecord;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Print packages as an aligned table
    pub fn packages(&self, records: &[PackageRecord], with_available: bool) {
        let mut headers = vec!["Name", "Id", "Version"];
        if with_available {
            headers.push("Available");
        }
        headers.push("Source");
        headers.push("Status");

        let rows: Vec<Vec<&str>> = records
            .iter()
            .map(|r| {
                let mut row = vec![r.name.as_str(), r.id.as_str(), r.current_version.as_str()];
                if with_available {
                    row.push(r.available_version.as_str());
                }
                row.push(r.source.as_str());
                row.push(r.status.as_str());
                row
            })
            .collect();

        let mut lines = format_table(&headers, &rows).into_iter();
        if let Some(header) = lines.next() {
            println!("{}", style(header).bold());
        }
        for line in lines {
            println!("{}", line);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Lay out rows in columns padded to the widest cell, header first
pub fn format_table(headers: &[&str], rows: &[Vec<&str>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(headers));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(|row| render(row.as_slice())));
    lines
}
