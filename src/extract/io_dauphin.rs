// Reader for the Dauphin County results (text dump of the results site).

use std::collections::HashMap;

use log::{debug, info};
use precinct_rows::builder::RowBuilder;
use precinct_rows::text::{is_upper, split_trailing_counts};
use precinct_rows::{CandidateLine, ElectionMetadata, ResultRow};

use crate::extract::io_common::Unmatched;

// Column order of the report. The total is not written out.
const VOTE_MODES: [&str; 4] = ["Machine", "Mail-in", "Provisional", "Total"];

/// The parties of the candidates of the 2024 general election.
///
/// The report does not print the parties.
const PARTIES_2024: [(&str, &str); 37] = [
    // PRESIDENT OF THE UNITED STATES
    ("KAMALA D HARRIS", "DEM"),
    ("DONALD J TRUMP", "REP"),
    ("CHASE OLIVER", "LIBRT"),
    ("JILL STEIN", "GREEN"),
    // UNITED STATES SENATOR
    ("ROBERT P CASEY JR", "DEM"),
    ("DAVE MCCORMICK", "REP"),
    ("JOHN C THOMAS", "LIBRT"),
    ("LEILA HAZOU", "GREEN"),
    ("MARTY SELKER", "CONSTITUTION"),
    // ATTORNEY GENERAL
    ("EUGENE DEPASQUALE", "DEM"),
    ("DAVE SUNDAY", "REP"),
    ("ROBERT COWBURN", "LIBRT"),
    ("RICHARD L WEISS", "GREEN"),
    ("JUSTIN L MAGILL", "CONSTITUTION"),
    ("ERIC L SETTLE", "FORWARD"),
    // AUDITOR GENERAL
    ("MALCOLM KENYATTA", "DEM"),
    ("TIM DEFOOR", "REP"),
    ("REECE SMITH", "LIBRT"),
    ("ERIC K ANTON", "AMERICAN SOLIDARITY"),
    ("BOB GOODRICH", "CONSTITUTION"),
    // STATE TREASURER
    ("ERIN MCCLELLAND", "DEM"),
    ("STACY GARRITY", "REP"),
    ("NICKOLAS CIESIELSKI", "LIBRT"),
    ("TROY BOWMAN", "CONSTITUTION"),
    ("CHRIS FOSTER", "FORWARD"),
    // REPRESENTATIVE IN CONGRESS
    ("JANELLE STELSON", "DEM"),
    ("SCOTT PERRY", "REP"),
    // SENATOR IN THE GENERAL ASSEMBLY - SD15
    ("PATTY KIM", "DEM"),
    ("NICK DIFRANCESCO", "REP"),
    // REPRESENTATIVE IN THE GENERAL ASSEMBLY - HD103
    ("NATE DAVIDSON", "DEM"),
    ("CINDI WARD", "REP"),
    // HD104
    ("DAVE MADSEN", "DEM"),
    // HD105
    ("JUSTIN C FLEMING", "DEM"),
    // HD106
    ("ANJU SINGH", "DEM"),
    ("TOM MEHAFFIE", "REP"),
    // HD125
    ("GENE STILP", "DEM"),
    ("JOE KERWIN", "REP"),
];

pub fn default_party_lookup() -> HashMap<String, String> {
    PARTIES_2024
        .iter()
        .map(|(name, party)| (name.to_string(), party.to_string()))
        .collect()
}

fn is_url(line: &str) -> bool {
    line.starts_with("http://") || line.starts_with("https://")
}

pub fn parse(
    lines: &[String],
    metadata: &ElectionMetadata,
    parties: &HashMap<String, String>,
) -> (Vec<ResultRow>, Unmatched) {
    let mut builder = RowBuilder::new(metadata);
    let mut unmatched = Unmatched::default();
    let mut current_precinct: Option<String> = None;
    let mut current_office: Option<String> = None;

    for raw in lines.iter() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if is_url(line) {
            debug!("parse: source url {}", line);
            builder.set_source_url(line);
        } else if line.contains("Machine") && line.contains("Mail-in") {
            // Column headers
            continue;
        } else if let Some((head, counts)) = split_trailing_counts(line, 4, 5) {
            let candidate = head.join(" ");
            let entry = CandidateLine {
                precinct: current_precinct.clone().unwrap_or_default(),
                office: current_office.clone().unwrap_or_default(),
                party: parties.get(&candidate).cloned().unwrap_or_default(),
                writein: candidate == "WRITE-IN",
                candidate,
            };
            let modes: Vec<(&str, u64)> = VOTE_MODES
                .iter()
                .zip(counts.iter())
                .filter(|(mode, _)| **mode != "Total")
                .map(|(mode, votes)| (*mode, *votes))
                .collect();
            builder.add_modes(&entry, &modes);
        } else if is_upper(line) {
            current_office = Some(line.to_string());
        } else if current_office.is_some() {
            current_precinct = Some(line.to_string());
        } else {
            unmatched.push(line);
        }
    }

    let rows = builder.build();
    info!(
        "dauphin: parsed {} rows, {} unmatched lines",
        rows.len(),
        unmatched.lines.len()
    );
    (rows, unmatched)
}
