// Montgomery County statement of votes: every precinct is a block of rows,
// one per vote method, under a header of candidates.

use precinct_rows::text::normalize_whitespace;
use serde::{Deserialize, Serialize};

use crate::extract::io_tables::Table;
use crate::extract::lattice::{LatticeCounty, PageRecords, RaceEntry};

pub const DEFAULT_SPLIT_KEYWORD: &str = "Vote for";

const METHODS: [&str; 4] = ["Mail-in", "Provisional", "Election Day", "Total"];
const SPECIAL_VALUES: [&str; 2] = ["County", "PA County"];
const TURNOUT_MARKER: &str = "Times Cast";

/// The order of the offices in the output file.
pub const DEFAULT_OFFICE_RANKING: [&str; 6] = [
    "PRESIDENTIAL ELECTORS",
    "UNITED STATES SENATOR",
    "REPRESENTATIVE IN CONGRESS",
    "ATTORNEY GENERAL",
    "AUDITOR GENERAL",
    "SENATOR IN THE GENERAL ASSEMBLY",
];

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MethodVotes {
    pub precinct: String,
    pub method: String,
    pub candidate: String,
    pub votes: String,
}

#[derive(Default)]
pub struct Montgomery {}

pub fn transform_table(table: &Table) -> Vec<MethodVotes> {
    let header = table.header();
    let mut res: Vec<MethodVotes> = Vec::new();
    let mut current_precinct = String::new();
    for row in table.data_rows() {
        let first = row.first().map(|s| s.trim()).unwrap_or("");
        if METHODS.contains(&first) {
            for (candidate, votes) in header.iter().zip(row.iter()).skip(1) {
                let candidate = candidate.replace('\n', " ").trim().to_string();
                if candidate.is_empty() || candidate == "Total Votes" {
                    continue;
                }
                res.push(MethodVotes {
                    precinct: current_precinct.clone(),
                    method: first.to_string(),
                    candidate,
                    votes: votes.trim().to_string(),
                });
            }
        } else if !SPECIAL_VALUES.contains(&first) {
            current_precinct = normalize_whitespace(first);
        }
    }
    res
}

impl LatticeCounty for Montgomery {
    type Record = MethodVotes;

    // Turnout tables are set aside.
    fn page_records(&self, tables: &[Table]) -> PageRecords<MethodVotes> {
        let mut pr = PageRecords {
            records: Vec::new(),
            skipped: Vec::new(),
            parsed_tables: 0,
        };
        for (idx, table) in tables.iter().enumerate() {
            if table.contains(TURNOUT_MARKER) {
                pr.skipped.push((idx + 1, table.clone()));
            } else {
                pr.records.append(&mut transform_table(table));
                pr.parsed_tables += 1;
            }
        }
        pr
    }

    fn race_entry(&self, record: &MethodVotes) -> RaceEntry {
        RaceEntry {
            precinct: record.precinct.clone(),
            candidate: record.candidate.clone(),
            party: String::new(),
            vote_mode: record.method.clone(),
            votes: record.votes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn statement() -> Table {
        table(&[
            &[
                "",
                "KAMALA D HARRIS\n(DEM)",
                "DONALD J TRUMP\n(REP)",
                "Total Votes",
            ],
            &["Abington 1-1", "", "", ""],
            &["Election Day", "300", "120", "420"],
            &["Mail-in", "250", "40", "290"],
            &["Total", "550", "160", "710"],
            &["County", "", "", ""],
            &["Abington 1-2", "", "", ""],
            &["Provisional", "3", "1", "4"],
        ])
    }

    #[test]
    fn method_rows() {
        let records = transform_table(&statement());
        assert_eq!(records.len(), 8);
        assert_eq!(
            records[0],
            MethodVotes {
                precinct: "Abington 1-1".to_string(),
                method: "Election Day".to_string(),
                candidate: "KAMALA D HARRIS (DEM)".to_string(),
                votes: "300".to_string(),
            }
        );
        assert_eq!(records[3].method, "Mail-in");
        assert_eq!(records[3].votes, "40");
        assert_eq!(records[6].precinct, "Abington 1-2");
        assert_eq!(records[7].candidate, "DONALD J TRUMP (REP)");
    }

    #[test]
    fn turnout_tables_are_skipped() {
        let turnout = table(&[&["", "Registered Voters", "Times Cast"], &["Abington 1-1", "900", "710"]]);
        let pr = Montgomery::default().page_records(&[turnout.clone(), statement()]);
        assert_eq!(pr.skipped, vec![(1, turnout.clone())]);
        assert_eq!(pr.parsed_tables, 1);
        assert_eq!(pr.records.len(), 8);

        let only_turnout = Montgomery::default().page_records(&[turnout]);
        assert_eq!(only_turnout.parsed_tables, 0);
    }

    #[test]
    fn every_method_is_written() {
        let m = Montgomery::default();
        let records = transform_table(&statement());
        let entries: Vec<RaceEntry> = records.iter().map(|r| m.race_entry(r)).collect();
        assert_eq!(entries.len(), 8);
        let modes: Vec<&str> = entries
            .iter()
            .filter(|e| e.candidate == "KAMALA D HARRIS (DEM)" && e.precinct == "Abington 1-1")
            .map(|e| e.vote_mode.as_str())
            .collect();
        assert_eq!(modes, vec!["Election Day", "Mail-in", "Total"]);
    }
}
