use std::collections::HashMap;
use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::{OptionExt, ResultExt};

use crate::extract::*;

/// The description of the dataset, shared by all the rows.
///
/// Every field is optional: the missing ones come from the defaults of the
/// county.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    pub election: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    #[serde(rename = "resultStatus")]
    pub result_status: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
    #[serde(rename = "datetimeRetrieved")]
    pub datetime_retrieved: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "unmatchedFile")]
    pub unmatched_file: Option<String>,
}

impl OutputSettings {
    /// Fills the missing values with the ones of `defaults`.
    pub fn or(&self, defaults: &OutputSettings) -> OutputSettings {
        OutputSettings {
            election: self.election.clone().or_else(|| defaults.election.clone()),
            state: self.state.clone().or_else(|| defaults.state.clone()),
            county: self.county.clone().or_else(|| defaults.county.clone()),
            result_status: self
                .result_status
                .clone()
                .or_else(|| defaults.result_status.clone()),
            source_url: self
                .source_url
                .clone()
                .or_else(|| defaults.source_url.clone()),
            datetime_retrieved: self
                .datetime_retrieved
                .clone()
                .or_else(|| defaults.datetime_retrieved.clone()),
            output_file: self
                .output_file
                .clone()
                .or_else(|| defaults.output_file.clone()),
            unmatched_file: self
                .unmatched_file
                .clone()
                .or_else(|| defaults.unmatched_file.clone()),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "sourceFilename")]
    pub source_filename: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
    // Text reports
    #[serde(rename = "skipPrefixes")]
    pub skip_prefixes: Option<Vec<String>>,
    #[serde(rename = "pageBreakPrefix")]
    pub page_break_prefix: Option<String>,
    #[serde(rename = "cleanedFile")]
    pub cleaned_file: Option<String>,
    #[serde(rename = "partyLookup")]
    pub party_lookup: Option<HashMap<String, String>>,
    // PDF reports
    #[serde(rename = "headerKeywords")]
    pub header_keywords: Option<Vec<String>>,
    #[serde(rename = "splitKeyword")]
    pub split_keyword: Option<String>,
    #[serde(rename = "officeRanking")]
    pub office_ranking: Option<Vec<String>>,
    #[serde(rename = "skipPrecinctWords")]
    pub skip_precinct_words: Option<Vec<String>>,
    #[serde(rename = "sectionsDirectory")]
    pub sections_directory: Option<String>,
    #[serde(rename = "tablesDirectory")]
    pub tables_directory: Option<String>,
    #[serde(rename = "racesDirectory")]
    pub races_directory: Option<String>,
    #[serde(rename = "workers")]
    pub _workers: Option<JSValue>,
}

impl FileSource {
    pub fn workers(&self) -> ExtractResult<Option<usize>> {
        if self._workers.is_some() {
            read_js_int(&self._workers).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "sourceFiles")]
    pub source_files: Vec<FileSource>,
}

pub fn read_config(path: &str) -> ExtractResult<JobConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: JobConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

// Counts may be written as numbers or as strings in the configuration.
fn read_js_int(x: &Option<JSValue>) -> ExtractResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}
