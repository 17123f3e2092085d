// Reader for the Cumberland County precinct results report (text dump).

use log::{debug, info};
use once_cell::sync::Lazy;
use precinct_rows::builder::RowBuilder;
use precinct_rows::text::{is_upper, mentions_write_in, split_trailing_counts};
use precinct_rows::{CandidateLine, ElectionMetadata, ResultRow};
use regex::Regex;

use crate::extract::io_common::Unmatched;

pub const PAGE_BREAK: &str = "-PAGE-BREAK-";

pub const DEFAULT_SKIP_PREFIXES: [&str; 10] = [
    "Precinct Results Report",
    "2024 GENERAL ELECTION",
    "Result Book - Precinct Report -",
    "STATISTICS",
    "Registered Voters",
    "Ballots Cast",
    "Voter Turnout",
    "TOTAL",
    "Day Mail",
    "Vote For",
];

pub const DEFAULT_PAGE_BREAK_PREFIX: &str = "November 5, 2024 Cumberland County";

// Column order of the report. The total is not written out.
const VOTE_MODES: [&str; 4] = ["Total", "Election Day", "Mail", "Provisional"];

static THOUSANDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d),(\d)").unwrap());

/// Cleans the raw report before parsing.
///
/// Report headers are dropped, the page footers become [PAGE_BREAK] markers
/// and the thousands separators are removed from the numbers.
pub fn preprocess(
    lines: &[String],
    skip_prefixes: &[String],
    page_break_prefix: &str,
) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for raw in lines.iter() {
        let line = raw.trim();
        if skip_prefixes.iter().any(|p| line.starts_with(p.as_str())) {
            continue;
        }
        if line.starts_with(page_break_prefix) {
            cleaned.push(PAGE_BREAK.to_string());
            continue;
        }
        let line = THOUSANDS.replace_all(line, "${1}${2}");
        if !line.is_empty() {
            cleaned.push(line.to_string());
        }
    }
    debug!(
        "preprocess: {} lines in, {} lines out",
        lines.len(),
        cleaned.len()
    );
    cleaned
}

/// Parses the cleaned report into rows.
pub fn parse(lines: &[String], metadata: &ElectionMetadata) -> (Vec<ResultRow>, Unmatched) {
    let mut builder = RowBuilder::new(metadata);
    let mut unmatched = Unmatched::default();
    let mut current_precinct: Option<String> = None;
    let mut current_office: Option<String> = None;

    let mut iter = lines.iter().map(|l| l.trim());
    while let Some(line) = iter.next() {
        if line.is_empty() {
            continue;
        }

        // The line after a page break names the precinct.
        if line == PAGE_BREAK {
            current_precinct = iter.next().map(|l| l.to_string());
            current_office = None;
            debug!("parse: precinct {:?}", current_precinct);
            continue;
        }

        if let Some((head, counts)) = split_trailing_counts(line, 4, 5) {
            let mut party = head[0].to_string();
            let mut candidate = head[1..].join(" ");
            // The write-in totals line reads "Write-in Totals ...".
            if candidate == "Totals" && party == "Write-in" {
                candidate = "WRITE-IN".to_string();
                party = "".to_string();
            }
            let writein = mentions_write_in(&candidate);
            let entry = CandidateLine {
                precinct: current_precinct.clone().unwrap_or_default(),
                office: current_office.clone().unwrap_or_default(),
                candidate,
                party,
                writein,
            };
            let modes: Vec<(&str, u64)> = VOTE_MODES
                .iter()
                .zip(counts.iter())
                .filter(|(mode, _)| **mode != "Total")
                .map(|(mode, votes)| (*mode, *votes))
                .collect();
            builder.add_modes(&entry, &modes);
        } else if current_precinct.is_some() && is_upper(line) {
            current_office = Some(line.to_string());
        } else {
            unmatched.push(line);
        }
    }

    let rows = builder.build();
    info!(
        "cumberland: parsed {} rows, {} unmatched lines",
        rows.len(),
        unmatched.lines.len()
    );
    (rows, unmatched)
}
