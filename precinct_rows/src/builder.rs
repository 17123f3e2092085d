pub use crate::config::*;

/// A builder for adding result rows.
///
/// The builder stamps the dataset metadata on every row, so that the county
/// readers only deal with what they parse.
///
/// ```
/// use precinct_rows::builder::RowBuilder;
/// use precinct_rows::{CandidateLine, ElectionMetadata};
///
/// let metadata = ElectionMetadata {
///     election: "2024 GENERAL".to_string(),
///     county: "CUMBERLAND COUNTY".to_string(),
///     ..Default::default()
/// };
/// let mut builder = RowBuilder::new(&metadata);
/// let line = CandidateLine {
///     precinct: "CAMP HILL 1".to_string(),
///     office: "PRESIDENT".to_string(),
///     candidate: "JANE DOE".to_string(),
///     ..Default::default()
/// };
/// builder.add_modes(&line, &[("Election Day", 10), ("Mail", 4)]);
///
/// assert_eq!(builder.rows().len(), 2);
/// ```
pub struct RowBuilder {
    pub(crate) _metadata: ElectionMetadata,
    pub(crate) _rows: Vec<ResultRow>,
}

impl RowBuilder {
    pub fn new(metadata: &ElectionMetadata) -> RowBuilder {
        RowBuilder {
            _metadata: metadata.clone(),
            _rows: Vec::new(),
        }
    }

    pub fn metadata(&self) -> &ElectionMetadata {
        &self._metadata
    }

    /// Changes the source URL for all the rows added from now on.
    ///
    /// Some reports interleave the URL of each section with the results.
    pub fn set_source_url(&mut self, url: &str) {
        self._metadata.source_url = url.to_string();
    }

    /// Changes the source file name for all the rows added from now on.
    pub fn set_source_filename(&mut self, name: &str) {
        self._metadata.source_filename = name.to_string();
    }

    /// Adds a single row for the given vote mode.
    pub fn add_vote(&mut self, line: &CandidateLine, vote_mode: &str, votes: u64) {
        let m = &self._metadata;
        self._rows.push(ResultRow {
            election: m.election.clone(),
            state: m.state.clone(),
            county: m.county.clone(),
            precinct: line.precinct.clone(),
            office: line.office.clone(),
            candidate: line.candidate.clone(),
            party: line.party.clone(),
            vote_mode: vote_mode.to_string(),
            votes,
            writein: WriteIn::from(line.writein),
            result_status: m.result_status.clone(),
            source_url: m.source_url.clone(),
            source_filename: m.source_filename.clone(),
            datetime_retrieved: m.datetime_retrieved.clone(),
        });
    }

    /// Adds one row per vote mode, in the order given.
    pub fn add_modes(&mut self, line: &CandidateLine, modes: &[(&str, u64)]) {
        for (mode, votes) in modes {
            self.add_vote(line, mode, *votes);
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self._rows
    }

    pub fn build(self) -> Vec<ResultRow> {
        self._rows
    }
}
