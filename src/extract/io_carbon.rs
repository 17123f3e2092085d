// Carbon County: one lattice table per page, precincts down the rows and
// (candidate, votes) column pairs across.

use log::debug;
use once_cell::sync::Lazy;
use precinct_rows::text::{normalize_whitespace, parse_votes};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::io_tables::Table;
use crate::extract::lattice::{LatticeCounty, PageRecords, RaceEntry};

pub const DEFAULT_SKIP_PRECINCT_WORDS: [&str; 3] = ["total", "cumulative", "carbon"];

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PrecinctVotes {
    pub precinct: String,
    pub candidate: String,
    pub votes: u64,
}

static RUNNING_MATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[^()]*\(").unwrap());

/// `KAMALA D HARRIS / TIM WALZ (DEM)` -> `KAMALA D HARRIS (DEM)`
pub fn clean_candidate_name(name: &str) -> String {
    let name = normalize_whitespace(name);
    RUNNING_MATE.replace_all(&name, "(").to_string()
}

pub struct Carbon {
    /// Rows whose precinct contains one of these words are not precincts.
    pub skip_precinct_words: Vec<String>,
}

impl Default for Carbon {
    fn default() -> Carbon {
        Carbon {
            skip_precinct_words: DEFAULT_SKIP_PRECINCT_WORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Carbon {
    fn is_skipped_precinct(&self, precinct: &str) -> bool {
        let lower = precinct.to_lowercase();
        self.skip_precinct_words
            .iter()
            .any(|w| lower.contains(&w.to_lowercase()))
    }

    pub fn transform_table(&self, table: &Table) -> Vec<PrecinctVotes> {
        let header = table.header();
        let mut res: Vec<PrecinctVotes> = Vec::new();
        for row in table.data_rows() {
            let precinct = normalize_whitespace(row.first().map(|s| s.as_str()).unwrap_or(""));
            if self.is_skipped_precinct(&precinct) {
                continue;
            }
            for i in (1..row.len()).step_by(2) {
                if i >= header.len() {
                    break;
                }
                let candidate = clean_candidate_name(&header[i]);
                if candidate.is_empty() || candidate.to_lowercase() == "total votes" {
                    continue;
                }
                res.push(PrecinctVotes {
                    precinct: precinct.clone(),
                    candidate,
                    votes: parse_votes(&row[i]).unwrap_or(0),
                });
            }
        }
        res
    }
}

impl LatticeCounty for Carbon {
    type Record = PrecinctVotes;

    // Only the first table of a page carries results.
    fn page_records(&self, tables: &[Table]) -> PageRecords<PrecinctVotes> {
        if tables.len() > 1 {
            debug!("carbon: ignoring {} extra tables", tables.len() - 1);
        }
        let records = tables
            .first()
            .map(|t| self.transform_table(t))
            .unwrap_or_default();
        PageRecords {
            records,
            skipped: Vec::new(),
            parsed_tables: tables.len().min(1),
        }
    }

    fn sort_race(&self, records: &mut Vec<PrecinctVotes>) {
        records.sort_by(|a, b| {
            a.precinct
                .cmp(&b.precinct)
                .then_with(|| a.candidate.cmp(&b.candidate))
        });
    }

    fn race_entry(&self, record: &PrecinctVotes) -> RaceEntry {
        RaceEntry {
            precinct: record.precinct.clone(),
            candidate: record.candidate.clone(),
            party: String::new(),
            vote_mode: "Total".to_string(),
            votes: record.votes.to_string(),
        }
    }
}
