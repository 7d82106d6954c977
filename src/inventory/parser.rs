//! Package Table Parser
//!
//! Converts the fixed-width tables printed by the package manager into
//! `PackageRecord`s. Columns are separated by runs of two or more whitespace
//! characters; anything that cannot be read as a row is skipped.
//!
//! ```text
//! Name      Id               Version  Available  Source
//! -----------------------------------------------------
//! 7-Zip     7zip.7zip        22.01    23.01      winget
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::heuristics::{find_source_tag, is_header_line, is_separator_line, matches_source_tag};
use crate::constants::{source, table};
use crate::types::PackageRecord;

/// Two or more consecutive whitespace characters delimit columns
static COLUMN_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("column delimiter regex is valid"));

/// Which table layout is being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// `list` output: name, id, version, optional source
    Inventory,
    /// `upgrade` output: name, id, version, available, optional source
    Upgradable,
}

impl ParseMode {
    fn min_fields(self) -> usize {
        match self {
            Self::Inventory => table::INVENTORY_MIN_FIELDS,
            Self::Upgradable => table::UPGRADABLE_MIN_FIELDS,
        }
    }
}

/// Parse raw CLI output into records, preserving table order
///
/// Never fails: input without a header yields an empty vector.
pub fn parse(raw: &str, mode: ParseMode) -> Vec<PackageRecord> {
    let lines: Vec<&str> = raw
        .lines()
        .map(clean_line)
        .filter(|l| !l.trim().is_empty())
        .collect();

    let Some(header) = lines.iter().position(|l| is_header_line(l)) else {
        debug!("No table header found in {} bytes of output", raw.len());
        return Vec::new();
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (i, line) in lines.iter().enumerate().skip(header + 1) {
        let line = *line;
        if is_separator_line(line) {
            continue;
        }
        // A continuation table repeats the header followed by a separator
        let next_is_separator = lines.get(i + 1).is_some_and(|next| is_separator_line(next));
        if next_is_separator && is_header_line(line) {
            continue;
        }

        let fields = split_fields(line);
        let parsed = match mode {
            ParseMode::Inventory => parse_inventory_row(&fields),
            ParseMode::Upgradable => parse_upgradable_row(&fields),
        };

        match parsed {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                trace!("Skipping malformed {:?} row: {:?}", mode, line);
            }
        }
    }

    debug!(
        "Parsed {} {:?} records ({} lines skipped)",
        records.len(),
        mode,
        skipped
    );
    records
}

/// Keep only what was printed after the last carriage return (spinner frames)
fn clean_line(line: &str) -> &str {
    let line = line.rsplit('\r').next().unwrap_or(line);
    line.trim_end()
}

/// Split a data line into ordered column values
pub fn split_fields(line: &str) -> Vec<&str> {
    COLUMN_DELIMITER
        .split(line.trim())
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

fn parse_inventory_row(fields: &[&str]) -> Option<PackageRecord> {
    if fields.len() < ParseMode::Inventory.min_fields() {
        return None;
    }

    let record = PackageRecord::new(fields[0], fields[1], fields[2]);

    let record = match fields.get(3) {
        None => record,
        Some(fourth) => match (matches_source_tag(fourth), find_source_tag(fields[4..].iter().copied())) {
            // `list` can print an Available column before Source
            (None, Some(tag)) => record.with_available(*fourth).with_source(tag),
            (Some(tag), _) => record.with_source(tag),
            (None, None) => record.with_source(*fourth),
        },
    };

    Some(record)
}

fn parse_upgradable_row(fields: &[&str]) -> Option<PackageRecord> {
    if fields.len() < ParseMode::Upgradable.min_fields() {
        return None;
    }

    let (available, source_tag) = match matches_source_tag(fields[3]) {
        // The version column was empty and Source slid left
        Some(tag) => {
            let available = fields.get(4)?;
            let later = find_source_tag(fields[5..].iter().copied());
            (*available, later.unwrap_or(tag))
        }
        None => {
            let tag = find_source_tag(fields[4..].iter().copied()).unwrap_or(source::PRIMARY);
            (fields[3], tag)
        }
    };

    Some(
        PackageRecord::new(fields[0], fields[1], fields[2])
            .with_available(available)
            .with_source(source_tag),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UPGRADE_OUTPUT: &str = "\
   - \r   \\ \r\
Name                 Id                       Version      Available    Source
---------------------------------------------------------------------------------
7-Zip                7zip.7zip                22.01        23.01        winget
Mozilla Firefox      Mozilla.Firefox          124.0        125.0.1      winget
Microsoft Teams      XP8BT8DW290MPQ           24004        24033        msstore
3 upgrades available.
";

    const LIST_OUTPUT: &str = "\
Name                           Id                          Version        Available   Source
----------------------------------------------------------------------------------------------
Git                            Git.Git                     2.44.0         2.45.1      winget
Notepad++                      Notepad++.Notepad++         8.6.4                      winget
Windows Terminal               Microsoft.WindowsTerminal   1.19.10573.0
Spotify Music                  9NCBCSZSJRSB                1.2.31         msstore
";

    #[test]
    fn test_parse_upgradable_table() {
        let records = parse(UPGRADE_OUTPUT, ParseMode::Upgradable);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].name, "7-Zip");
        assert_eq!(records[0].id, "7zip.7zip");
        assert_eq!(records[0].current_version, "22.01");
        assert_eq!(records[0].available_version, "23.01");
        assert_eq!(records[0].source, "winget");

        assert_eq!(records[1].name, "Mozilla Firefox");
        assert_eq!(records[2].source, "msstore");
    }

    #[test]
    fn test_seven_zip_row() {
        let raw = "Name  Id  Version  Available  Source\n---\n7-Zip  7-Zip.7-Zip  22.01  23.01  winget\n";
        let records = parse(raw, ParseMode::Upgradable);
        assert_eq!(
            records,
            vec![
                PackageRecord::new("7-Zip", "7-Zip.7-Zip", "22.01")
                    .with_available("23.01")
                    .with_source("winget")
            ]
        );
    }

    #[test]
    fn test_shifted_row_without_fifth_field_is_discarded() {
        let raw = "Name  Id  Version  Available  Source\n---\nFoo  Foo.Id  1.0  winget\n";
        assert!(parse(raw, ParseMode::Upgradable).is_empty());
    }

    #[test]
    fn test_shifted_row_takes_fifth_field_as_available() {
        let raw = "Name  Id  Version  Available  Source\nFoo  Foo.Id  1.0  winget  2.0\n";
        let records = parse(raw, ParseMode::Upgradable);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].available_version, "2.0");
        assert_eq!(records[0].source, "winget");
    }

    #[test]
    fn test_upgradable_defaults_to_primary_source() {
        let raw = "Name  Id  Version  Available\nFoo  Foo.Id  1.0  2.0\n";
        let records = parse(raw, ParseMode::Upgradable);
        assert_eq!(records[0].source, source::PRIMARY);
    }

    #[test]
    fn test_parse_inventory_table() {
        let records = parse(LIST_OUTPUT, ParseMode::Inventory);
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].id, "Git.Git");
        assert_eq!(records[0].available_version, "2.45.1");
        assert_eq!(records[0].source, "winget");

        assert_eq!(records[1].name, "Notepad++");
        assert_eq!(records[1].available_version, "");
        assert_eq!(records[1].source, "winget");

        assert_eq!(records[2].name, "Windows Terminal");
        assert_eq!(records[2].source, source::PRIMARY);

        assert_eq!(records[3].source, "msstore");
    }

    #[test]
    fn test_inventory_keeps_unknown_fourth_field_as_source() {
        let raw = "Name  Id  Version  Source\nTool  Vendor.Tool  1.0  custom-feed\n";
        let records = parse(raw, ParseMode::Inventory);
        assert_eq!(records[0].source, "custom-feed");
    }

    #[test]
    fn test_preamble_before_header_is_ignored() {
        let raw = "Found 7-Zip  7zip.7zip  noise  more\nName  Id  Version\nA  Vendor.A  1.0\n";
        let records = parse(raw, ParseMode::Inventory);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "A");
    }

    #[test]
    fn test_continuation_table_header_is_skipped() {
        let raw = "\
Name  Id  Version  Available  Source
------------------------------------
A  Vendor.A  1.0  2.0  winget
The following packages have an upgrade available, but require explicit targeting:
Name  Id  Version  Available  Source
------------------------------------
B  Vendor.B  1.0  3.0  winget
";
        let records = parse(raw, ParseMode::Upgradable);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Vendor.A", "Vendor.B"]);
    }

    #[test]
    fn test_header_like_data_row_is_kept() {
        let raw = "\
Name  Id  Version  Available  Source
------------------------------------
NameTag Identity Versioner  Vendor.NT  1.0  2.0  winget
";
        let records = parse(raw, ParseMode::Upgradable);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "NameTag Identity Versioner");
        assert_eq!(records[0].id, "Vendor.NT");
        assert_eq!(records[0].available_version, "2.0");
    }

    #[test]
    fn test_header_and_separator_only_yields_nothing() {
        let raw = "Name  Id  Version  Available  Source\n------------------\n\n";
        assert!(parse(raw, ParseMode::Upgradable).is_empty());
        assert!(parse(raw, ParseMode::Inventory).is_empty());
    }

    #[test]
    fn test_missing_header_yields_nothing() {
        assert!(parse("", ParseMode::Inventory).is_empty());
        assert!(parse("No installed package found.", ParseMode::Inventory).is_empty());
        assert!(parse("A  Vendor.A  1.0  2.0  winget", ParseMode::Upgradable).is_empty());
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(
            split_fields("  Mozilla Firefox   Mozilla.Firefox\t\t124.0 "),
            vec!["Mozilla Firefox", "Mozilla.Firefox", "124.0"]
        );
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(raw in ".{0,400}") {
            let _ = parse(&raw, ParseMode::Inventory);
            let _ = parse(&raw, ParseMode::Upgradable);
        }

        #[test]
        fn prop_no_header_means_no_records(raw in "[a-z0-9 .\n-]{0,300}") {
            // Lowercase-only input can never contain the "Name" header label
            prop_assert!(parse(&raw, ParseMode::Inventory).is_empty());
            prop_assert!(parse(&raw, ParseMode::Upgradable).is_empty());
        }

        #[test]
        fn prop_one_record_per_valid_row(
            rows in proptest::collection::vec(
                ("[A-Za-z][A-Za-z0-9]{0,8}", "[A-Za-z]{1,6}\\.[A-Za-z]{1,6}", "[0-9]{1,3}\\.[0-9]{1,3}", "[0-9]{1,3}\\.[0-9]{1,3}"),
                0..20,
            )
        ) {
            let mut raw = String::from("Name  Id  Version  Available  Source\n-----------\n");
            for (name, id, current, available) in &rows {
                raw.push_str(&format!("{}  {}  {}  {}  winget\n", name, id, current, available));
            }

            let records = parse(&raw, ParseMode::Upgradable);
            prop_assert_eq!(records.len(), rows.len());
            for (record, (name, id, current, available)) in records.iter().zip(&rows) {
                prop_assert_eq!(&record.name, name);
                prop_assert_eq!(&record.id, id);
                prop_assert_eq!(&record.current_version, current);
                prop_assert_eq!(&record.available_version, available);
            }
        }
    }
}
