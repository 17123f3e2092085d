use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use precinct_rows::{write_rows, ElectionMetadata, ResultRow};
use text_diff::print_diff;

use crate::extract::config_reader::*;
use crate::extract::io_common::{
    create_dir, file_stem, list_files, read_lines, simplify_file_name, write_text, Unmatched,
};
use crate::extract::io_tables::ExportedTables;
use crate::extract::lattice::LatticeCounty;

mod config_reader;
mod io_carbon;
mod io_common;
mod io_cumberland;
mod io_dauphin;
mod io_lehigh;
mod io_montgomery;
mod io_pdf;
mod io_tables;
mod lattice;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExtractError {
    #[snafu(display("Error opening file {path}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error creating directory {path}"))]
    CreatingDirectory {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV file {path}"))]
    CsvRead { source: csv::Error, path: String },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error opening configuration file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("Error opening PDF file {path}"))]
    OpeningPdf { source: lopdf::Error, path: String },
    #[snafu(display("Error saving PDF file {path}"))]
    SavingPdf {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Unknown provider {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Unknown stage {stage:?}"))]
    UnknownStage { stage: String },
    #[snafu(display("Stage {stage} is not available for provider {provider}"))]
    UnsupportedStage { provider: String, stage: String },
    #[snafu(display("No input: pass a configuration file or an input file with its type"))]
    MissingInput {},
    #[snafu(display("Difference detected between {path} and the reference {reference}"))]
    ReferenceMismatch { path: String, reference: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;

const DEFAULT_SECTIONS_DIRECTORY: &str = "split_sections";
const DEFAULT_TABLES_DIRECTORY: &str = "tables";
const DEFAULT_RACES_DIRECTORY: &str = "races";
const DEFAULT_WORKERS: usize = 4;

/// The counties with a known report layout.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum County {
    Carbon,
    Cumberland,
    Dauphin,
    Lehigh,
    Montgomery,
    Wayne,
}

fn settings(
    state: &str,
    county: &str,
    result_status: Option<&str>,
    source_url: Option<&str>,
    datetime_retrieved: Option<&str>,
    output_file: Option<&str>,
    unmatched_file: Option<&str>,
) -> OutputSettings {
    OutputSettings {
        election: Some("2024 GENERAL".to_string()),
        state: Some(state.to_string()),
        county: Some(county.to_string()),
        result_status: result_status.map(|s| s.to_string()),
        source_url: source_url.map(|s| s.to_string()),
        datetime_retrieved: datetime_retrieved.map(|s| s.to_string()),
        output_file: output_file.map(|s| s.to_string()),
        unmatched_file: unmatched_file.map(|s| s.to_string()),
    }
}

impl County {
    pub fn from_provider(provider: &str) -> ExtractResult<County> {
        match provider.trim().to_lowercase().as_str() {
            "carbon" => Ok(County::Carbon),
            "cumberland" => Ok(County::Cumberland),
            "dauphin" => Ok(County::Dauphin),
            "lehigh" => Ok(County::Lehigh),
            "montgomery" => Ok(County::Montgomery),
            "wayne" => Ok(County::Wayne),
            _ => UnknownProviderSnafu { provider }.fail(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            County::Carbon => "carbon",
            County::Cumberland => "cumberland",
            County::Dauphin => "dauphin",
            County::Lehigh => "lehigh",
            County::Montgomery => "montgomery",
            County::Wayne => "wayne",
        }
    }

    /// The description of the 2024 general election dataset of the county.
    pub fn defaults(&self) -> OutputSettings {
        match self {
            County::Carbon => settings(
                "PENNSYLVANIA",
                "CARBON COUNTY",
                None,
                None,
                None,
                Some("carbon_parsed.csv"),
                Some("carbon_unmatched.txt"),
            ),
            County::Cumberland => settings(
                "PENNSYLVANIA",
                "CUMBERLAND COUNTY",
                Some("OFFICIAL"),
                Some("https://www.cumberlandcountypa.gov/DocumentCenter/View/52475/Official-Precinct-Report"),
                Some("11/19/2024 08:53AM"),
                Some("cumberland_parsed.csv"),
                Some("cumberland_unmatched.txt"),
            ),
            County::Dauphin => settings(
                "PENNSYLVANIA",
                "DAUPHIN COUNTY",
                Some("PRELIMINARY"),
                None,
                Some("11/25/2024 12:36"),
                Some("dauphin_parsed.csv"),
                Some("dauphin_unmatched.txt"),
            ),
            County::Lehigh => settings(
                "PENNSYLVANIA",
                "LEHIGH COUNTY",
                Some("OFFICIAL"),
                Some("https://www.livevoterturnout.com/ENR/lehighpaenr/8/en/Index_8.html"),
                Some("12/7/2024 10:39PM"),
                Some("lehigh_parsed.csv"),
                Some("lehigh_unmatched.txt"),
            ),
            County::Montgomery => settings(
                "PENNSYLVANIA",
                "MONTGOMERY COUNTY",
                Some("UNOFFICIAL"),
                Some("https://www.montgomerycountypa.gov/DocumentCenter/View/45586/2024UnofficialGeneralElectionStatementofVotesCast?bidId="),
                Some("11/19/2024 3:35:01 PM"),
                Some("parsed_results.csv"),
                Some("unmatched_lines.txt"),
            ),
            County::Wayne => settings(
                "MICHIGAN",
                "WAYNE COUNTY",
                None,
                None,
                None,
                None,
                None,
            ),
        }
    }

    fn sections_directory(&self) -> &'static str {
        match self {
            County::Wayne => "split_races",
            _ => DEFAULT_SECTIONS_DIRECTORY,
        }
    }

    fn stages(&self) -> &'static [Stage] {
        match self {
            County::Cumberland | County::Dauphin | County::Lehigh => &[Stage::Rows],
            County::Carbon | County::Montgomery => &[Stage::Split, Stage::Tables, Stage::Rows],
            County::Wayne => &[Stage::Split],
        }
    }
}

const WAYNE_HEADER_KEYWORDS: [&str; 4] = [
    "Wayne County, Michigan",
    "20241105 Wayne General Election",
    "Precinct Canvass",
    "November 5, 2024",
];

/// The steps of the PDF counties. The text counties only have rows.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Stage {
    Split,
    Tables,
    Rows,
    All,
}

impl Stage {
    pub fn from_name(name: &str) -> ExtractResult<Stage> {
        match name.trim().to_lowercase().as_str() {
            "split" => Ok(Stage::Split),
            "tables" => Ok(Stage::Tables),
            "rows" => Ok(Stage::Rows),
            "all" => Ok(Stage::All),
            _ => UnknownStageSnafu { stage: name }.fail(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Stage::Split => "split",
            Stage::Tables => "tables",
            Stage::Rows => "rows",
            Stage::All => "all",
        }
    }
}

/// What to run, as given on the command line.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<String>,
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub out: Option<String>,
    pub stage: Option<String>,
    pub workers: Option<usize>,
    pub reference: Option<String>,
    /// Pages to run table by table in the tables stage, instead of the
    /// whole sections.
    pub pages: Option<Vec<u32>>,
    /// Restricts `pages` to the section PDF with this file stem.
    pub section: Option<String>,
}

fn resolve(root: &Path, p: &str) -> PathBuf {
    let path = Path::new(p);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn now_retrieved() -> String {
    chrono::Local::now().format("%m/%d/%Y %I:%M%p").to_string()
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

// Everything a county needs to know about one source file.
struct SourceJob<'a> {
    county: County,
    source: &'a FileSource,
    root: &'a Path,
    metadata: ElectionMetadata,
    workers: usize,
    pages: Option<&'a [u32]>,
    section: Option<&'a str>,
}

impl<'a> SourceJob<'a> {
    fn input(&self) -> PathBuf {
        resolve(self.root, &self.source.file_path)
    }

    fn dir(&self, configured: &Option<String>, default: &str) -> (PathBuf, String) {
        let label = configured.clone().unwrap_or_else(|| default.to_string());
        (resolve(self.root, &label), label)
    }

    fn sections_dir(&self) -> PathBuf {
        self.dir(
            &self.source.sections_directory,
            self.county.sections_directory(),
        )
        .0
    }
}

fn split_stage(job: &SourceJob) -> ExtractResult<()> {
    let input = job.input();
    let doc = io_pdf::load_pdf(&input)?;
    let pages = io_pdf::page_texts(&doc);
    let sections = match job.county {
        County::Wayne => {
            let keywords = job
                .source
                .header_keywords
                .clone()
                .unwrap_or_else(|| strings(&WAYNE_HEADER_KEYWORDS));
            io_pdf::split_by_race_header(&pages, &keywords)
        }
        _ => {
            let keyword = job
                .source
                .split_keyword
                .clone()
                .unwrap_or_else(|| io_montgomery::DEFAULT_SPLIT_KEYWORD.to_string());
            io_pdf::split_by_keyword(&pages, &keyword)
        }
    };
    if sections.is_empty() {
        warn!("No sections found in {}", input.display());
    }
    let out_dir = job.sections_dir();
    create_dir(&out_dir)?;
    let written = io_pdf::write_sections(&doc, &sections, &out_dir)?;
    info!(
        "Split {} into {} files in {}",
        input.display(),
        written.len(),
        out_dir.display()
    );
    Ok(())
}

fn carbon(job: &SourceJob) -> io_carbon::Carbon {
    match &job.source.skip_precinct_words {
        Some(words) => io_carbon::Carbon {
            skip_precinct_words: words.clone(),
        },
        None => io_carbon::Carbon::default(),
    }
}

fn tables_stage(job: &SourceJob) -> ExtractResult<()> {
    match job.county {
        County::Carbon => run_tables(&carbon(job), job),
        _ => run_tables(&io_montgomery::Montgomery::default(), job),
    }
}

fn run_tables<C: LatticeCounty>(county: &C, job: &SourceJob) -> ExtractResult<()> {
    let (tables_dir, _) = job.dir(&job.source.tables_directory, DEFAULT_TABLES_DIRECTORY);
    let (races_dir, _) = job.dir(&job.source.races_directory, DEFAULT_RACES_DIRECTORY);
    let tables = ExportedTables { root: tables_dir };
    let sections_dir = job.sections_dir();

    if let Some(pages) = job.pages {
        let pdfs: Vec<PathBuf> = list_files(&sections_dir, "pdf")?
            .into_iter()
            .filter(|p| job.section.map(|s| file_stem(p) == s).unwrap_or(true))
            .collect();
        if pdfs.is_empty() {
            warn!("No section PDF to debug in {}", sections_dir.display());
        }
        for pdf in pdfs.iter() {
            let written = lattice::debug_pages(county, &tables, pdf, &races_dir, pages)?;
            info!("Debug run of {}: {} files written", pdf.display(), written.len());
        }
        return Ok(());
    }

    let report = lattice::extract_tables(county, &tables, &sections_dir, &races_dir, job.workers)?;
    for (name, e) in report.failed_sections.iter() {
        warn!("Section {} failed: {}", name, e);
    }
    Ok(())
}

fn rows_stage(job: &SourceJob) -> ExtractResult<(Vec<ResultRow>, Unmatched)> {
    match job.county {
        County::Cumberland => {
            let raw = read_lines(&job.input())?;
            let skip_prefixes = job
                .source
                .skip_prefixes
                .clone()
                .unwrap_or_else(|| strings(&io_cumberland::DEFAULT_SKIP_PREFIXES));
            let page_break_prefix = job
                .source
                .page_break_prefix
                .clone()
                .unwrap_or_else(|| io_cumberland::DEFAULT_PAGE_BREAK_PREFIX.to_string());
            let cleaned = io_cumberland::preprocess(&raw, &skip_prefixes, &page_break_prefix);
            if let Some(cleaned_file) = &job.source.cleaned_file {
                let p = resolve(job.root, cleaned_file);
                write_text(&p, &cleaned.join("\n"))?;
                info!("Cleaned report written to {}", p.display());
            }
            Ok(io_cumberland::parse(&cleaned, &job.metadata))
        }
        County::Dauphin => {
            let lines = read_lines(&job.input())?;
            let mut parties: HashMap<String, String> = io_dauphin::default_party_lookup();
            if let Some(extra) = &job.source.party_lookup {
                parties.extend(extra.clone());
            }
            Ok(io_dauphin::parse(&lines, &job.metadata, &parties))
        }
        County::Lehigh => {
            let input = job.input();
            let path_s = input.display().to_string();
            info!("Attempting to read input file {:?}", path_s);
            let f = File::open(&input).context(OpeningInputSnafu { path: &path_s })?;
            io_lehigh::read_lehigh(f, &path_s, &job.metadata)
        }
        County::Carbon | County::Montgomery => {
            let (races_dir, races_label) =
                job.dir(&job.source.races_directory, DEFAULT_RACES_DIRECTORY);
            let ranking: Vec<String> = match (&job.source.office_ranking, job.county) {
                (Some(r), _) => r.clone(),
                (None, County::Montgomery) => strings(&io_montgomery::DEFAULT_OFFICE_RANKING),
                (None, _) => Vec::new(),
            };
            if job.county == County::Carbon {
                lattice::race_rows(&carbon(job), &races_dir, &races_label, &job.metadata, &ranking)
            } else {
                lattice::race_rows(
                    &io_montgomery::Montgomery::default(),
                    &races_dir,
                    &races_label,
                    &job.metadata,
                    &ranking,
                )
            }
        }
        County::Wayne => UnsupportedStageSnafu {
            provider: job.county.name(),
            stage: Stage::Rows.name(),
        }
        .fail(),
    }
}

// Runs the stages of one source. Returns the rows when the rows stage ran.
fn run_source(
    job: &SourceJob,
    stage: Stage,
) -> ExtractResult<Option<(Vec<ResultRow>, Unmatched)>> {
    let available = job.county.stages();
    if stage != Stage::All && !available.contains(&stage) {
        return UnsupportedStageSnafu {
            provider: job.county.name(),
            stage: stage.name(),
        }
        .fail();
    }
    let runs = |s: Stage| available.contains(&s) && (stage == s || stage == Stage::All);

    // The sections of Carbon usually come already split.
    let split_requested = stage == Stage::Split
        || job.county != County::Carbon
        || job.source.split_keyword.is_some();
    if runs(Stage::Split) && split_requested {
        split_stage(job)?;
    }
    if runs(Stage::Tables) {
        tables_stage(job)?;
    }
    if runs(Stage::Rows) {
        return rows_stage(job).map(Some);
    }
    Ok(None)
}

fn check_reference(produced: &str, out_label: &str, reference: &str) -> ExtractResult<()> {
    let expected = fs::read_to_string(reference).context(OpeningInputSnafu { path: reference })?;
    if expected != produced {
        warn!("Found differences with the reference file");
        print_diff(expected.as_str(), produced, "\n");
        return ReferenceMismatchSnafu {
            path: out_label,
            reference,
        }
        .fail();
    }
    info!("Output matches the reference {}", reference);
    Ok(())
}

/// Runs the extraction described by the options.
///
/// With a configuration file, the paths of the configuration are relative
/// to it, and `input` / `input_type` override the first source.
pub fn run(options: &RunOptions) -> ExtractResult<()> {
    let (mut config, root) = match &options.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (JobConfig::default(), PathBuf::new()),
    };
    info!("config: {:?}", config);

    if config.source_files.is_empty() {
        match (&options.input, &options.input_type) {
            (Some(_), Some(_)) => config.source_files.push(FileSource::default()),
            _ => return MissingInputSnafu {}.fail(),
        }
    }
    if let Some(input) = &options.input {
        config.source_files[0].file_path = input.clone();
    }
    if let Some(input_type) = &options.input_type {
        config.source_files[0].provider = input_type.clone();
    }

    let stage = match &options.stage {
        Some(s) => Stage::from_name(s)?,
        None => Stage::All,
    };

    let mut rows: Vec<ResultRow> = Vec::new();
    let mut unmatched = Unmatched::default();
    let mut produced_rows = false;
    let mut out_settings: Option<OutputSettings> = None;

    for source in config.source_files.iter() {
        let county = County::from_provider(&source.provider)?;
        let s = config.output_settings.or(&county.defaults());
        let metadata = ElectionMetadata {
            election: s.election.clone().unwrap_or_default(),
            state: s.state.clone().unwrap_or_default(),
            county: s.county.clone().unwrap_or_default(),
            result_status: s.result_status.clone().unwrap_or_default(),
            source_url: source
                .source_url
                .clone()
                .or_else(|| s.source_url.clone())
                .unwrap_or_default(),
            source_filename: source
                .source_filename
                .clone()
                .unwrap_or_else(|| simplify_file_name(Path::new(&source.file_path))),
            datetime_retrieved: s
                .datetime_retrieved
                .clone()
                .unwrap_or_else(now_retrieved),
        };
        debug!("run: {} metadata {:?}", county.name(), metadata);
        let job = SourceJob {
            county,
            source,
            root: &root,
            metadata,
            workers: options
                .workers
                .or(source.workers()?)
                .unwrap_or(DEFAULT_WORKERS),
            pages: options.pages.as_deref(),
            section: options.section.as_deref(),
        };
        if let Some((mut r, mut u)) = run_source(&job, stage)? {
            info!("{}: {} rows", county.name(), r.len());
            rows.append(&mut r);
            unmatched.append(&mut u);
            produced_rows = true;
        }
        if out_settings.is_none() {
            out_settings = Some(s);
        }
    }

    if !produced_rows {
        return Ok(());
    }
    let s = out_settings.unwrap_or_default();

    let mut buffer: Vec<u8> = Vec::new();
    write_rows(&mut buffer, &rows).context(CsvWriteSnafu { path: "<memory>" })?;
    let produced = String::from_utf8_lossy(&buffer).to_string();

    let out_label = match (&options.out, &s.output_file) {
        (Some(o), _) if o == "stdout" => {
            print!("{}", produced);
            o.clone()
        }
        (Some(o), _) => {
            write_text(Path::new(o), &produced)?;
            o.clone()
        }
        (None, Some(o)) => {
            let p = resolve(&root, o);
            write_text(&p, &produced)?;
            p.display().to_string()
        }
        (None, None) => {
            print!("{}", produced);
            "stdout".to_string()
        }
    };
    info!("{} rows written to {}", rows.len(), out_label);

    match &s.unmatched_file {
        Some(u) => unmatched.write_to(&resolve(&root, u))?,
        None if !unmatched.is_empty() => {
            warn!("{} unmatched lines were not saved", unmatched.lines.len())
        }
        None => {}
    }

    if let Some(reference) = &options.reference {
        check_reference(&produced, &out_label, reference)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::io_pdf::tests::make_pdf;
    use precinct_rows::{read_rows, WriteIn, COLUMNS};

    const DAUPHIN_REPORT: &str = "Turnout is unofficial\n\
        https://example.org/dauphin/president\n\
        PRESIDENT OF THE UNITED STATES\n\
        Berrysburg Boro\n\
        Machine Mail-in Provisional Total\n\
        KAMALA D HARRIS 40 20 1 61\n\
        WRITE-IN 1 0 0 1\n";

    fn path_s(p: &Path) -> String {
        p.display().to_string()
    }

    #[test]
    fn providers() {
        assert_eq!(County::from_provider("Dauphin").unwrap(), County::Dauphin);
        assert!(matches!(
            County::from_provider("allegheny"),
            Err(ExtractError::UnknownProvider { .. })
        ));
        assert_eq!(Stage::from_name("TABLES").unwrap(), Stage::Tables);
        assert!(Stage::from_name("everything").is_err());
    }

    #[test]
    fn text_report_with_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dauphin_data.txt"), DAUPHIN_REPORT).unwrap();
        let config = dir.path().join("job.json");
        fs::write(
            &config,
            r#"{
                "outputSettings": {"datetimeRetrieved": "11/25/2024 12:36"},
                "sourceFiles": [{"provider": "dauphin", "filePath": "dauphin_data.txt"}]
            }"#,
        )
        .unwrap();
        let options = RunOptions {
            config: Some(path_s(&config)),
            ..Default::default()
        };
        run(&options).unwrap();

        let out = dir.path().join("dauphin_parsed.csv");
        let produced = fs::read_to_string(&out).unwrap();
        assert!(produced.starts_with(&COLUMNS.join(",")));
        let rows = read_rows(produced.as_bytes()).unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].county, "DAUPHIN COUNTY");
        assert_eq!(rows[0].result_status, "PRELIMINARY");
        assert_eq!(rows[0].party, "DEM");
        assert_eq!(rows[0].source_filename, "dauphin_data.txt");
        assert_eq!(rows[0].source_url, "https://example.org/dauphin/president");
        assert_eq!(rows[3].writein, WriteIn::Yes);

        let unmatched = fs::read_to_string(dir.path().join("dauphin_unmatched.txt")).unwrap();
        assert_eq!(unmatched, "Turnout is unofficial");

        // The output is its own reference.
        let checked = RunOptions {
            reference: Some(path_s(&out)),
            ..options.clone()
        };
        run(&checked).unwrap();

        let other = dir.path().join("other.csv");
        fs::write(&other, "precinct\n").unwrap();
        let mismatch = RunOptions {
            reference: Some(path_s(&other)),
            ..options
        };
        assert!(matches!(
            run(&mismatch),
            Err(ExtractError::ReferenceMismatch { .. })
        ));
    }

    #[test]
    fn input_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("precincts_8.csv");
        fs::write(
            &input,
            "\"Allentown 1-1\",\"State Treasurer\",\"REP Stacy Garrity\",\"95\",\"61.2%\"\n",
        )
        .unwrap();
        let out = dir.path().join("lehigh.csv");
        let options = RunOptions {
            input: Some(path_s(&input)),
            input_type: Some("lehigh".to_string()),
            out: Some(path_s(&out)),
            ..Default::default()
        };
        run(&options).unwrap();
        let rows = read_rows(File::open(&out).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].candidate, "Stacy Garrity");
        assert_eq!(rows[0].source_filename, "precincts_8.csv");
        assert_eq!(rows[0].datetime_retrieved, "12/7/2024 10:39PM");
    }

    #[test]
    fn missing_input_and_stages() {
        assert!(matches!(
            run(&RunOptions::default()),
            Err(ExtractError::MissingInput {})
        ));
        let options = RunOptions {
            input: Some("cumberland_data.txt".to_string()),
            input_type: Some("cumberland".to_string()),
            stage: Some("split".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            run(&options),
            Err(ExtractError::UnsupportedStage { .. })
        ));
    }

    #[test]
    fn montgomery_tables_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let sections = dir.path().join("split_sections");
        fs::create_dir_all(&sections).unwrap();
        for (name, pages) in [("AUDITOR_GENERAL", 1), ("PRESIDENTIAL_ELECTORS", 2)] {
            let content: Vec<&[&str]> = (0..pages).map(|_| &["Vote for 1"][..]).collect();
            let mut doc = make_pdf(&content);
            doc.save(sections.join(format!("{}.pdf", name))).unwrap();
        }

        let tables = dir.path().join("tables");
        let pe = tables.join("PRESIDENTIAL_ELECTORS");
        let ag = tables.join("AUDITOR_GENERAL");
        fs::create_dir_all(&pe).unwrap();
        fs::create_dir_all(&ag).unwrap();
        fs::write(
            pe.join("page_1_table_1.csv"),
            ",\"KAMALA D HARRIS\n(DEM)\",Total Votes\n\
             Abington 1-1,,\n\
             Election Day,300,300\n\
             Total,300,300\n",
        )
        .unwrap();
        fs::write(pe.join("page_2_table_1.csv"), ",Times Cast\nAbington 1-1,310\n").unwrap();
        fs::write(
            ag.join("page_1_table_1.csv"),
            ",UNRESOLVED WRITE-IN\nAbington 1-1,\nMail-in,2\n",
        )
        .unwrap();

        let config = dir.path().join("job.json");
        fs::write(
            &config,
            r#"{"sourceFiles": [{"provider": "montgomery", "filePath": "report.pdf", "workers": 2}]}"#,
        )
        .unwrap();
        let tables_only = RunOptions {
            config: Some(path_s(&config)),
            stage: Some("tables".to_string()),
            ..Default::default()
        };
        run(&tables_only).unwrap();
        assert!(dir
            .path()
            .join("races/PRESIDENTIAL_ELECTORS/skipped/PRESIDENTIAL_ELECTORS_page_2_table_1.csv")
            .is_file());
        assert!(!dir.path().join("parsed_results.csv").exists());

        let rows_only = RunOptions {
            stage: Some("rows".to_string()),
            ..tables_only
        };
        run(&rows_only).unwrap();
        let rows = read_rows(File::open(dir.path().join("parsed_results.csv")).unwrap()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].office, "PRESIDENTIAL ELECTORS");
        assert_eq!(rows[0].candidate, "KAMALA D HARRIS");
        assert_eq!(rows[0].party, "DEM");
        assert_eq!(rows[0].vote_mode, "Election Day");
        assert_eq!(rows[0].votes, 300);
        assert_eq!(
            rows[0].source_filename,
            "races/PRESIDENTIAL_ELECTORS/presidential_electors.csv"
        );
        assert_eq!(rows[1].candidate, "KAMALA D HARRIS");
        assert_eq!(rows[1].vote_mode, "Total");
        assert_eq!(rows[1].votes, 300);
        assert_eq!(rows[2].office, "AUDITOR GENERAL");
        assert_eq!(rows[2].candidate, "(Other)");
        assert_eq!(rows[2].party, "Unresolved Write-In");
        assert_eq!(rows[2].writein, WriteIn::Yes);
        assert_eq!(rows[2].result_status, "UNOFFICIAL");
    }

    #[test]
    fn montgomery_debug_pages() {
        let dir = tempfile::tempdir().unwrap();
        let sections = dir.path().join("split_sections");
        fs::create_dir_all(&sections).unwrap();
        for name in ["AUDITOR_GENERAL", "PRESIDENTIAL_ELECTORS"] {
            let mut doc = make_pdf(&[&["Vote for 1"], &["Vote for 1"]]);
            doc.save(sections.join(format!("{}.pdf", name))).unwrap();
        }
        let pe = dir.path().join("tables/PRESIDENTIAL_ELECTORS");
        fs::create_dir_all(&pe).unwrap();
        fs::write(
            pe.join("page_2_table_1.csv"),
            ",DONALD J TRUMP (REP),Total Votes\nAbington 1-1,,\nMail-in,40,40\n",
        )
        .unwrap();
        fs::write(pe.join("page_2_table_2.csv"), ",Times Cast\nAbington 1-1,310\n").unwrap();

        let config = dir.path().join("job.json");
        fs::write(
            &config,
            r#"{"sourceFiles": [{"provider": "montgomery", "filePath": "report.pdf"}]}"#,
        )
        .unwrap();
        let options = RunOptions {
            config: Some(path_s(&config)),
            stage: Some("tables".to_string()),
            pages: Some(vec![2]),
            section: Some("PRESIDENTIAL_ELECTORS".to_string()),
            ..Default::default()
        };
        run(&options).unwrap();

        let debug_dir = dir.path().join("races/debug_pages");
        assert!(debug_dir.join("PRESIDENTIAL_ELECTORS_page_2.pdf").is_file());
        assert!(debug_dir
            .join("PRESIDENTIAL_ELECTORS_page_2_table_1.csv")
            .is_file());
        assert!(debug_dir
            .join("PRESIDENTIAL_ELECTORS_page_2_table_2_skipped.csv")
            .is_file());
        assert!(!debug_dir.join("AUDITOR_GENERAL_page_2.pdf").exists());
        assert!(!dir.path().join("races/PRESIDENTIAL_ELECTORS").exists());
    }
}
