// Reader for the Lehigh County CSV export.
// Columns: precinct, contest, candidate (with party prefix), votes, turnout.

use std::io::Read;

use log::{debug, info};
use precinct_rows::builder::RowBuilder;
use precinct_rows::text::mentions_write_in;
use precinct_rows::{CandidateLine, ElectionMetadata, ResultRow};
use snafu::ResultExt;

use crate::extract::io_common::Unmatched;
use crate::extract::*;

const NUM_COLUMNS: usize = 5;

/// Splits `REP Donald J. Trump` into the party and the candidate name.
///
/// The party is always the first three characters.
fn split_party_prefix(s: &str) -> (String, String) {
    let party: String = s.chars().take(3).collect();
    let candidate: String = s.chars().skip(4).collect();
    (party, candidate)
}

pub fn read_lehigh<R: Read>(
    input: R,
    path: &str,
    metadata: &ElectionMetadata,
) -> ExtractResult<(Vec<ResultRow>, Unmatched)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut builder = RowBuilder::new(metadata);
    let mut unmatched = Unmatched::default();

    for (idx, record_r) in rdr.records().enumerate() {
        let record = record_r.context(CsvReadSnafu { path })?;
        let raw = record.iter().collect::<Vec<&str>>().join(",");
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        if record.len() != NUM_COLUMNS {
            debug!("read_lehigh: line {}: {} fields", idx + 1, record.len());
            unmatched.push(&raw);
            continue;
        }
        let votes = match record[3].parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                // The header line lands here too.
                unmatched.push(&raw);
                continue;
            }
        };
        let (party, candidate) = split_party_prefix(&record[2]);
        let entry = CandidateLine {
            precinct: record[0].to_string(),
            office: record[1].to_string(),
            writein: mentions_write_in(&record[2]),
            candidate,
            party,
        };
        builder.add_vote(&entry, "Total", votes);
    }

    let rows = builder.build();
    info!(
        "lehigh: parsed {} rows, {} unmatched lines",
        rows.len(),
        unmatched.lines.len()
    );
    Ok((rows, unmatched))
}
