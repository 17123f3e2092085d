// ********* Output data structures ***********

use serde::{Deserialize, Serialize};

/// The columns of the output file, in order.
pub const COLUMNS: [&str; 14] = [
    "election",
    "state",
    "county",
    "precinct",
    "office",
    "candidate",
    "party",
    "vote_mode",
    "votes",
    "writein",
    "result_status",
    "source_url",
    "source_filename",
    "datetime_retrieved",
];

/// Whether a candidate was written in by the voters.
///
/// Serialized as `yes` / `no` in the output.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteIn {
    Yes,
    No,
}

impl From<bool> for WriteIn {
    fn from(b: bool) -> WriteIn {
        if b {
            WriteIn::Yes
        } else {
            WriteIn::No
        }
    }
}

/// One (precinct, candidate, vote mode) tally for one contest.
///
/// The field order is the column order of the output file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub election: String,
    pub state: String,
    pub county: String,
    pub precinct: String,
    pub office: String,
    pub candidate: String,
    pub party: String,
    pub vote_mode: String,
    pub votes: u64,
    pub writein: WriteIn,
    pub result_status: String,
    pub source_url: String,
    pub source_filename: String,
    pub datetime_retrieved: String,
}

// ********* Dataset metadata **********

/// The values that are identical for every row of a dataset.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionMetadata {
    pub election: String,
    pub state: String,
    pub county: String,
    pub result_status: String,
    pub source_url: String,
    pub source_filename: String,
    pub datetime_retrieved: String,
}

/// What a county reader knows about a line of results, before the vote
/// counts are split per vote mode.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CandidateLine {
    pub precinct: String,
    pub office: String,
    pub candidate: String,
    pub party: String,
    pub writein: bool,
}
