/*!
Normalized precinct-level election results.

Every county publishes its precinct results in its own layout. This crate
holds the one thing they all end up as: a flat row per
(precinct, candidate, vote mode) for a contest, and the CSV file those rows
are written to.

See the [manual] for the description of the columns.
*/

mod config;
use log::debug;

use std::io::Write;

pub mod builder;
pub mod manual;
pub mod text;

pub use crate::config::*;

/// Writes the rows as CSV, header first.
///
/// The header is written even when there are no rows.
pub fn write_rows<W: Write>(out: W, rows: &[ResultRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(COLUMNS)?;
    for row in rows.iter() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    debug!("write_rows: wrote {} rows", rows.len());
    Ok(())
}

/// Reads rows previously written by [write_rows].
pub fn read_rows<R: std::io::Read>(input: R) -> Result<Vec<ResultRow>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(input);
    rdr.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::builder::RowBuilder;
    use super::*;

    fn metadata() -> ElectionMetadata {
        ElectionMetadata {
            election: "2024 GENERAL".to_string(),
            state: "PENNSYLVANIA".to_string(),
            county: "LEHIGH COUNTY".to_string(),
            result_status: "OFFICIAL".to_string(),
            source_url: "https://example.org/results".to_string(),
            source_filename: "precincts_8.csv".to_string(),
            datetime_retrieved: "12/7/2024 10:39PM".to_string(),
        }
    }

    #[test]
    fn header_only_when_empty() {
        let mut buf: Vec<u8> = Vec::new();
        write_rows(&mut buf, &[]).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s.trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn rows_in_column_order() {
        let mut builder = RowBuilder::new(&metadata());
        let line = CandidateLine {
            precinct: "Allentown 1-1".to_string(),
            office: "President, Vice-President".to_string(),
            candidate: "JANE DOE".to_string(),
            party: "DEM".to_string(),
            writein: false,
        };
        builder.add_vote(&line, "Total", 12);
        let rows = builder.build();

        let mut buf: Vec<u8> = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2024 GENERAL,PENNSYLVANIA,LEHIGH COUNTY,Allentown 1-1,\"President, Vice-President\",\
             JANE DOE,DEM,Total,12,no,OFFICIAL,https://example.org/results,precincts_8.csv,\
             12/7/2024 10:39PM"
        );

        let back = read_rows(s.as_bytes()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn source_url_changes_apply_to_later_rows() {
        let mut builder = RowBuilder::new(&metadata());
        let line = CandidateLine {
            candidate: "WRITE-IN".to_string(),
            writein: true,
            ..Default::default()
        };
        builder.add_vote(&line, "Machine", 1);
        builder.set_source_url("https://example.org/other");
        builder.add_vote(&line, "Mail-in", 2);
        let rows = builder.build();
        assert_eq!(rows[0].source_url, "https://example.org/results");
        assert_eq!(rows[1].source_url, "https://example.org/other");
        assert_eq!(rows[1].writein, WriteIn::Yes);
    }
}
