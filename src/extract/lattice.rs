// From per-contest PDF files to per-contest CSV files, through the lattice
// tables of every page, and then to the output rows.
//
// Layout of the races directory:
//   races/<section>/parsed/<section>_page_<n>.csv      long format, one per page
//   races/<section>/skipped/<section>_page_<n>_...     tables set aside, errors
//   races/<section>/<section lowercase>.csv            merged page files
//   races/debug_pages/<section>_page_<n>...            per-page debug output

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use precinct_rows::builder::RowBuilder;
use precinct_rows::text::{mentions_write_in, parse_votes};
use precinct_rows::{CandidateLine, ElectionMetadata, ResultRow};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;

use crate::extract::io_common::{
    create_dir, file_stem, list_dirs, list_files, run_pool, write_text, Unmatched,
};
use crate::extract::io_pdf::{load_pdf, page_count, write_sections, Section};
use crate::extract::io_tables::{write_table, Table, TableSource};
use crate::extract::*;

/// What a county makes of the tables of one page.
#[derive(Debug, Clone)]
pub struct PageRecords<R> {
    pub records: Vec<R>,
    /// Tables set aside, with their position on the page (from 1).
    pub skipped: Vec<(usize, Table)>,
    /// Number of tables that were turned into records.
    pub parsed_tables: usize,
}

/// One line of a merged contest file, as needed for the output rows.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RaceEntry {
    pub precinct: String,
    pub candidate: String,
    pub party: String,
    pub vote_mode: String,
    pub votes: String,
}

/// The table layout of a county.
pub trait LatticeCounty: Sync {
    type Record: Serialize + DeserializeOwned + Send;

    fn page_records(&self, tables: &[Table]) -> PageRecords<Self::Record>;

    /// Orders the records of a contest after all the pages are merged.
    fn sort_race(&self, _records: &mut Vec<Self::Record>) {}

    /// The entry of the record in the output rows.
    fn race_entry(&self, record: &Self::Record) -> RaceEntry;
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum PageStatus {
    Parsed,
    AlreadyProcessed,
    NoTables,
    Skipped,
    Failed,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SectionReport {
    pub pages: u32,
    pub parsed: u32,
    pub skipped: u32,
    pub failed: u32,
    pub merged_records: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LatticeReport {
    pub sections: Vec<(String, SectionReport)>,
    pub failed_sections: Vec<(String, String)>,
}

/// Processes every section PDF of `sections_dir` with a pool of workers.
///
/// A failing page or section is logged and does not stop the others.
pub fn extract_tables<C: LatticeCounty>(
    county: &C,
    tables: &dyn TableSource,
    sections_dir: &Path,
    races_dir: &Path,
    workers: usize,
) -> ExtractResult<LatticeReport> {
    create_dir(races_dir)?;
    let pdfs = list_files(sections_dir, "pdf")?;
    info!(
        "Extracting tables of {} sections from {} with {} workers",
        pdfs.len(),
        sections_dir.display(),
        workers
    );

    let results = run_pool(pdfs, workers, |pdf_path| {
        let name = file_stem(&pdf_path);
        let res = process_section(county, tables, &pdf_path, races_dir);
        if let Err(e) = &res {
            warn!("Error processing {}: {}", pdf_path.display(), e);
        }
        (name, res.map_err(|e| e.to_string()))
    });

    let mut report = LatticeReport::default();
    for (name, res) in results {
        match res {
            Ok(sr) => {
                info!(
                    "  {}: {} pages, {} parsed, {} skipped, {} failed, {} records",
                    name, sr.pages, sr.parsed, sr.skipped, sr.failed, sr.merged_records
                );
                report.sections.push((name, sr))
            }
            Err(e) => report.failed_sections.push((name, e)),
        }
    }
    report.sections.sort_by(|a, b| a.0.cmp(&b.0));
    report.failed_sections.sort();
    info!(
        "Table extraction complete: {} sections, {} failed",
        report.sections.len(),
        report.failed_sections.len()
    );
    Ok(report)
}

fn page_file_name(section: &str, page: u32) -> String {
    format!("{}_page_{}.csv", section, page)
}

fn process_section<C: LatticeCounty>(
    county: &C,
    tables: &dyn TableSource,
    pdf_path: &Path,
    races_dir: &Path,
) -> ExtractResult<SectionReport> {
    let section = file_stem(pdf_path);
    let race_dir = races_dir.join(&section);
    let parsed_dir = race_dir.join("parsed");
    let skipped_dir = race_dir.join("skipped");
    create_dir(&parsed_dir)?;
    create_dir(&skipped_dir)?;

    let num_pages = page_count(pdf_path)?;
    info!("Processing {} with {} pages...", section, num_pages);

    let mut report = SectionReport {
        pages: num_pages,
        ..Default::default()
    };
    for page in 1..=num_pages {
        let status = match process_page(county, tables, &section, page, &parsed_dir, &skipped_dir)
        {
            Ok(status) => status,
            Err(e) => {
                warn!("  Error processing {}, page {}: {}", section, page, e);
                let error_file = skipped_dir.join(format!("{}_page_{}_error.txt", section, page));
                write_text(&error_file, &e.to_string())?;
                PageStatus::Failed
            }
        };
        match status {
            PageStatus::Parsed | PageStatus::AlreadyProcessed => report.parsed += 1,
            PageStatus::Skipped | PageStatus::NoTables => report.skipped += 1,
            PageStatus::Failed => report.failed += 1,
        }
    }

    let output = race_dir.join(format!("{}.csv", section.to_lowercase()));
    report.merged_records = merge_parsed(county, &parsed_dir, &output)?;
    info!("  Merged all parsed tables into {}.", output.display());
    Ok(report)
}

fn already_processed(skipped_dir: &Path, parsed_file: &Path, section: &str, page: u32) -> bool {
    if parsed_file.exists() {
        return true;
    }
    let prefix = format!("{}_page_{}_table_", section, page);
    match fs::read_dir(skipped_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with(&prefix)),
        Err(_) => false,
    }
}

fn process_page<C: LatticeCounty>(
    county: &C,
    tables: &dyn TableSource,
    section: &str,
    page: u32,
    parsed_dir: &Path,
    skipped_dir: &Path,
) -> ExtractResult<PageStatus> {
    let parsed_file = parsed_dir.join(page_file_name(section, page));
    if already_processed(skipped_dir, &parsed_file, section, page) {
        debug!("  Skipping {}, page {}: already processed.", section, page);
        return Ok(PageStatus::AlreadyProcessed);
    }

    let page_tables: Vec<Table> = tables
        .page_tables(section, page)?
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect();
    if page_tables.is_empty() {
        info!("  No tables found on {}, page {}.", section, page);
        return Ok(PageStatus::NoTables);
    }

    let pr = county.page_records(&page_tables);
    for (idx, table) in pr.skipped.iter() {
        let p = skipped_dir.join(format!("{}_page_{}_table_{}.csv", section, page, idx));
        write_table(table, &p)?;
    }
    if pr.parsed_tables == 0 {
        info!(
            "  All tables on {}, page {} were skipped.",
            section, page
        );
        return Ok(PageStatus::Skipped);
    }

    write_records(&pr.records, &parsed_file)?;
    debug!(
        "  {}, page {}: {} records",
        section,
        page,
        pr.records.len()
    );
    Ok(PageStatus::Parsed)
}

fn write_records<R: Serialize>(records: &[R], path: &Path) -> ExtractResult<()> {
    let path_s = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path: &path_s })?;
    for r in records.iter() {
        wtr.serialize(r).context(CsvWriteSnafu { path: &path_s })?;
    }
    wtr.flush().context(WritingOutputSnafu { path: &path_s })?;
    Ok(())
}

fn read_records<R: DeserializeOwned>(path: &Path) -> ExtractResult<Vec<R>> {
    let path_s = path.display().to_string();
    let mut rdr = csv::Reader::from_path(path).context(CsvReadSnafu { path: &path_s })?;
    let mut res: Vec<R> = Vec::new();
    for r in rdr.deserialize() {
        res.push(r.context(CsvReadSnafu { path: &path_s })?);
    }
    Ok(res)
}

// "<section>_page_12.csv" -> 12
fn page_of(path: &Path) -> u32 {
    file_stem(path)
        .rsplit("_page_")
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Merges the page files into a single contest file, in page order.
fn merge_parsed<C: LatticeCounty>(
    county: &C,
    parsed_dir: &Path,
    output: &Path,
) -> ExtractResult<usize> {
    let mut files = list_files(parsed_dir, "csv")?;
    if files.is_empty() {
        info!("  No parsed CSV files to merge in {}.", parsed_dir.display());
        return Ok(0);
    }
    files.sort_by_key(|p| page_of(p));
    let mut records: Vec<C::Record> = Vec::new();
    for f in files.iter() {
        records.append(&mut read_records(f)?);
    }
    county.sort_race(&mut records);
    write_records(&records, output)?;
    Ok(records.len())
}

/// Directory of the per-page debug output, under the races directory.
pub const DEBUG_DIR: &str = "debug_pages";

/// Runs the given pages of one section PDF table by table.
///
/// Each page is exported as a single-page PDF next to one CSV per table:
/// `<section>_page_<n>_table_<k>.csv` for the records of a parsed table,
/// `..._skipped.csv` for a table set aside. Nothing is written to the
/// parsed directories. Returns the files written.
pub fn debug_pages<C: LatticeCounty>(
    county: &C,
    tables: &dyn TableSource,
    pdf_path: &Path,
    races_dir: &Path,
    pages: &[u32],
) -> ExtractResult<Vec<PathBuf>> {
    let section = file_stem(pdf_path);
    let debug_dir = races_dir.join(DEBUG_DIR);
    create_dir(&debug_dir)?;
    let doc = load_pdf(pdf_path)?;
    let num_pages = doc.get_pages().len() as u32;

    let mut written: Vec<PathBuf> = Vec::new();
    for &page in pages.iter() {
        if page == 0 || page > num_pages {
            info!(
                "  {}: page {} out of range (1-{}), ignored.",
                section, page, num_pages
            );
            continue;
        }
        let single = Section {
            title: format!("{}_page_{}", section, page),
            pages: vec![page],
        };
        written.append(&mut write_sections(&doc, &[single], &debug_dir)?);

        let page_tables = match tables.page_tables(&section, page) {
            Ok(t) => t,
            Err(e) => {
                warn!("  Error reading the tables of {}, page {}: {}", section, page, e);
                let p = debug_dir.join(format!("{}_page_{}_error.txt", section, page));
                write_text(&p, &e.to_string())?;
                written.push(p);
                continue;
            }
        };
        info!("  {}, page {}: {} tables", section, page, page_tables.len());
        for (idx, table) in page_tables.iter().enumerate() {
            let idx = idx + 1;
            if table.is_empty() {
                info!("    Table {} is empty.", idx);
                continue;
            }
            let pr = county.page_records(std::slice::from_ref(table));
            if pr.parsed_tables == 0 {
                let p = debug_dir.join(format!(
                    "{}_page_{}_table_{}_skipped.csv",
                    section, page, idx
                ));
                write_table(table, &p)?;
                info!("    Table {} set aside: {}", idx, p.display());
                written.push(p);
            } else if pr.records.is_empty() {
                info!("    Table {} has no records.", idx);
            } else {
                let p = debug_dir.join(format!("{}_page_{}_table_{}.csv", section, page, idx));
                write_records(&pr.records, &p)?;
                info!("    Table {}: {} records in {}", idx, pr.records.len(), p.display());
                written.push(p);
            }
        }
    }
    Ok(written)
}

static PARTY_IN_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static PAREN_GROUPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

/// Upper-cases the candidate and moves a party in parentheses to the party.
///
/// Returns the candidate, the party and whether it is a write-in.
pub fn normalize_candidate(candidate: &str, party: &str) -> (String, String, bool) {
    let candidate = candidate.trim().to_uppercase();
    if candidate == "UNRESOLVED WRITE-IN" {
        return (
            "(Other)".to_string(),
            "Unresolved Write-In".to_string(),
            true,
        );
    }
    let (candidate, party) = match PARTY_IN_PARENS.captures(&candidate) {
        Some(caps) => (
            PAREN_GROUPS.replace_all(&candidate, "").trim().to_string(),
            caps[1].trim().to_string(),
        ),
        None => (candidate.clone(), party.trim().to_string()),
    };
    let writein = mentions_write_in(&party);
    (candidate, party, writein)
}

/// Position of the office in the ranking, by prefix. Unlisted offices
/// come last.
pub fn office_rank(office: &str, ranking: &[String]) -> usize {
    ranking
        .iter()
        .position(|r| office.starts_with(r.as_str()))
        .unwrap_or(ranking.len())
}

/// Turns the merged contest files into output rows.
///
/// `races_label` is how the races directory is written in the
/// `source_filename` column.
pub fn race_rows<C: LatticeCounty>(
    county: &C,
    races_dir: &Path,
    races_label: &str,
    metadata: &ElectionMetadata,
    ranking: &[String],
) -> ExtractResult<(Vec<ResultRow>, Unmatched)> {
    let mut ranked: Vec<(usize, ResultRow)> = Vec::new();
    let mut unmatched = Unmatched::default();

    for race_dir in list_dirs(races_dir)? {
        let name = match race_dir.file_name() {
            Some(n) => n.to_string_lossy().to_string(),
            None => continue,
        };
        let file_name = format!("{}.csv", name.to_lowercase());
        let race_csv: PathBuf = race_dir.join(&file_name);
        if !race_csv.is_file() {
            info!("Skipping {}: race-level CSV not found.", race_csv.display());
            continue;
        }
        let office = name.replace('_', " ").to_uppercase();
        info!("Processing office: {}", office);

        let records: Vec<C::Record> = match read_records(&race_csv) {
            Ok(r) => r,
            Err(e) => {
                unmatched.push(&format!("Error reading {}: {}", race_csv.display(), e));
                continue;
            }
        };

        let source_filename = format!("{}/{}/{}", races_label, name, file_name);
        let mut builder = RowBuilder::new(metadata);
        builder.set_source_filename(&source_filename);
        for record in records.iter() {
            let entry = county.race_entry(record);
            let votes = match parse_votes(&entry.votes) {
                Some(v) => v,
                None => {
                    unmatched.push(&format!(
                        "Error processing row in {}: {:?}",
                        source_filename, entry
                    ));
                    continue;
                }
            };
            let (candidate, party, writein) = normalize_candidate(&entry.candidate, &entry.party);
            let line = CandidateLine {
                precinct: entry.precinct.trim().to_string(),
                office: office.clone(),
                candidate,
                party,
                writein,
            };
            builder.add_vote(&line, &entry.vote_mode, votes);
        }
        let rank = office_rank(&office, ranking);
        ranked.extend(builder.build().into_iter().map(|r| (rank, r)));
    }

    // Stable: the rows of an office keep their order.
    ranked.sort_by_key(|(rank, _)| *rank);
    let rows: Vec<ResultRow> = ranked.into_iter().map(|(_, r)| r).collect();
    info!(
        "race_rows: {} rows, {} unmatched",
        rows.len(),
        unmatched.lines.len()
    );
    Ok((rows, unmatched))
}
