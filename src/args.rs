use clap::Parser;

/// Extracts precinct-level election results from county reports into a common CSV format.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the job: the output settings and the source files.
    /// Paths in this file are relative to its location.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The report to read. Setting this option overrides the path of the first source
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// The county layout of the input: carbon, cumberland, dauphin, lehigh, montgomery or wayne.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the rows are written in CSV format to the given
    /// location. Setting this option overrides the output file of the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default all) For the PDF reports: split, tables, rows or all.
    #[clap(long, value_parser)]
    pub stage: Option<String>,

    /// (default 4) The number of section files processed in parallel.
    #[clap(long, value_parser)]
    pub workers: Option<usize>,

    /// (file path) A reference CSV file. If provided, the program checks that the rows it writes
    /// match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (comma-separated page numbers) Debugging of the tables stage: only these pages of the section
    /// files are processed, table by table. Every page is also saved as a single-page PDF.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub pages: Option<Vec<u32>>,

    /// (section file name without extension) With --pages, only this section file is processed.
    #[clap(long, value_parser)]
    pub section: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
