// Splitting of the PDF reports into one file per contest.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use lopdf::Document;
use precinct_rows::text::section_file_stem;
use snafu::ResultExt;

use crate::extract::*;

/// The pages of one contest. Pages are numbered from 1.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Section {
    pub title: String,
    pub pages: Vec<u32>,
}

impl Section {
    fn add_page(&mut self, page: u32) {
        if !self.pages.contains(&page) {
            self.pages.push(page);
        }
    }
}

fn section_for<'a>(sections: &'a mut Vec<Section>, title: &str) -> &'a mut Section {
    let idx = match sections.iter().position(|s| s.title == title) {
        Some(idx) => idx,
        None => {
            sections.push(Section {
                title: title.to_string(),
                pages: Vec::new(),
            });
            sections.len() - 1
        }
    };
    &mut sections[idx]
}

pub fn load_pdf(path: &Path) -> ExtractResult<Document> {
    info!("Attempting to read PDF file {:?}", path);
    Document::load(path).context(OpeningPdfSnafu {
        path: path.display().to_string(),
    })
}

pub fn page_count(path: &Path) -> ExtractResult<u32> {
    let doc = load_pdf(path)?;
    Ok(doc.get_pages().len() as u32)
}

/// The text of every page, in page order.
///
/// A page whose text cannot be extracted counts as empty.
pub fn page_texts(doc: &Document) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => res.push(text),
            Err(e) => {
                warn!("page_texts: page {}: could not extract text: {}", page_num, e);
                res.push(String::new());
            }
        }
    }
    res
}

/// Splits on the pages that contain `keyword`.
///
/// The title of a section is the text in front of the keyword on the first
/// line that contains it. A section runs until the next page with the
/// keyword. Sections that carry the same title are merged, so that a
/// contest that spans several pages stays in one file.
pub fn split_by_keyword(pages: &[String], keyword: &str) -> Vec<Section> {
    let mut starts: Vec<(usize, String)> = Vec::new();
    for (idx, text) in pages.iter().enumerate() {
        if !text.contains(keyword) {
            continue;
        }
        if let Some(line) = text.lines().find(|l| l.contains(keyword)) {
            let title = line.split(keyword).next().unwrap_or("").trim();
            debug!("split_by_keyword: page {}: {:?}", idx + 1, title);
            starts.push((idx, title.to_string()));
        }
    }

    let mut sections: Vec<Section> = Vec::new();
    for (i, (start, title)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map(|(s, _)| *s).unwrap_or(pages.len());
        let section = section_for(&mut sections, title);
        for page_idx in *start..end {
            section.add_page((page_idx + 1) as u32);
        }
    }
    sections
}

/// Splits on the race headers of a precinct canvass.
///
/// A race header starts with `1 ` and may wrap over the following lines
/// until a line starts with a digit. Hyphenated wraps are glued back
/// together. Every page is assigned to each race that has a header on it.
pub fn split_by_race_header(pages: &[String], header_keywords: &[String]) -> Vec<Section> {
    let mut races: Vec<Section> = Vec::new();

    for (idx, text) in pages.iter().enumerate() {
        let page = (idx + 1) as u32;
        let mut parts: Vec<String> = Vec::new();
        let mut collecting = false;

        let lines = text
            .lines()
            .filter(|l| !header_keywords.iter().any(|k| k.as_str() == l.trim()));
        for line in lines {
            if line.starts_with("1 ") {
                if !parts.is_empty() {
                    let race = parts.join(" ");
                    section_for(&mut races, race.trim()).add_page(page);
                    parts.clear();
                }
                collecting = true;
                parts.push(line.split_whitespace().skip(1).collect::<Vec<&str>>().join(" "));
            } else if collecting && line.trim().is_empty() {
                continue;
            } else if collecting && !line.starts_with(|c: char| c.is_ascii_digit()) {
                match parts.last_mut() {
                    // "VICE-" followed by "PRESIDENT"
                    Some(last) if last.ends_with('-') => last.push_str(line.trim()),
                    _ => parts.push(line.trim().to_string()),
                }
            } else {
                collecting = false;
            }
        }
        if !parts.is_empty() {
            let race = parts.join(" ");
            section_for(&mut races, race.trim()).add_page(page);
        }
    }
    debug!("split_by_race_header: {} races", races.len());
    races
}

/// Writes every section as its own PDF file, named after its title.
pub fn write_sections(
    doc: &Document,
    sections: &[Section],
    out_dir: &Path,
) -> ExtractResult<Vec<PathBuf>> {
    let num_pages = doc.get_pages().len() as u32;
    let mut written: Vec<PathBuf> = Vec::new();
    for section in sections.iter() {
        let dropped: Vec<u32> = (1..=num_pages)
            .filter(|p| !section.pages.contains(p))
            .collect();
        let mut section_doc = doc.clone();
        section_doc.delete_pages(&dropped);
        section_doc.prune_objects();
        section_doc.compress();

        let path = out_dir.join(format!("{}.pdf", section_file_stem(&section.title)));
        section_doc.save(&path).context(SavingPdfSnafu {
            path: path.display().to_string(),
        })?;
        info!("Saved: {} ({} pages)", path.display(), section.pages.len());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// A PDF with one page per entry, each page showing its lines of text.
    pub(crate) fn make_pdf(pages: &[&[&str]]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let mut kids: Vec<Object> = Vec::new();
        for lines in pages.iter() {
            let mut operations: Vec<Operation> = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![50.into(), (800 - 20 * i as i64).into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn texts(pages: &[&str]) -> Vec<String> {
        pages.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keyword_sections() {
        let pages = texts(&[
            "Statement of Votes Cast\nSummary",
            "PRESIDENTIAL ELECTORS Vote for 1\nPrecinct A",
            "Precinct B",
            "UNITED STATES SENATOR Vote for 1\nPrecinct A",
            "ATTORNEY GENERAL\n(Vote for 1)\nPrecinct A",
        ]);
        let sections = split_by_keyword(&pages, "Vote for");
        assert_eq!(
            sections,
            vec![
                Section {
                    title: "PRESIDENTIAL ELECTORS".to_string(),
                    pages: vec![2, 3]
                },
                Section {
                    title: "UNITED STATES SENATOR".to_string(),
                    pages: vec![4]
                },
                Section {
                    title: "(".to_string(),
                    pages: vec![5]
                },
            ]
        );
    }

    #[test]
    fn keyword_sections_with_repeated_titles() {
        let pages = texts(&[
            "PRESIDENTIAL ELECTORS Vote for 1",
            "PRESIDENTIAL ELECTORS Vote for 1",
            "AUDITOR GENERAL Vote for 1",
        ]);
        let sections = split_by_keyword(&pages, "Vote for");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].pages, vec![1, 2]);
        assert_eq!(sections[1].pages, vec![3]);
    }

    #[test]
    fn race_headers() {
        let header = vec![
            "Wayne County, Michigan".to_string(),
            "Precinct Canvass".to_string(),
        ];
        let pages = texts(&[
            "Wayne County, Michigan\nPrecinct Canvass\n1 Electors of President and Vice-\nPresident of the United States\n2 Precinct 1\n100 20",
            "Wayne County, Michigan\n1 Electors of President and Vice-\nPresident of the United States\n2 Precinct 2\n1 United States Senator\n3 Precinct 1",
            "Precinct Canvass\n2 Precinct 3\n10 1",
        ]);
        let races = split_by_race_header(&pages, &header);
        assert_eq!(
            races,
            vec![
                Section {
                    title: "Electors of President and Vice-President of the United States"
                        .to_string(),
                    pages: vec![1, 2]
                },
                Section {
                    title: "United States Senator".to_string(),
                    pages: vec![2]
                },
            ]
        );
    }

    #[test]
    fn wrapped_race_header_followed_by_another_race() {
        let pages = texts(&[
            "1 \nELECTORS\n1 SENATOR\n2 Precinct 1",
            "1 \nELECTORS\n2 Precinct 2",
        ]);
        let races = split_by_race_header(&pages, &[]);
        assert_eq!(
            races,
            vec![
                Section {
                    title: "ELECTORS".to_string(),
                    pages: vec![1, 2]
                },
                Section {
                    title: "SENATOR".to_string(),
                    pages: vec![1]
                },
            ]
        );
    }

    #[test]
    fn sections_are_written_as_pdfs() {
        let doc = make_pdf(&[&["page one"], &["page two"], &["page three"]]);
        let dir = tempfile::tempdir().unwrap();
        let sections = vec![
            Section {
                title: "STATE TREASURER".to_string(),
                pages: vec![1, 3],
            },
            Section {
                title: "".to_string(),
                pages: vec![2],
            },
        ];
        let written = write_sections(&doc, &sections, dir.path()).unwrap();
        assert_eq!(written[0], dir.path().join("STATE_TREASURER.pdf"));
        assert_eq!(written[1], dir.path().join("Untitled.pdf"));
        assert_eq!(page_count(&written[0]).unwrap(), 2);
        assert_eq!(page_count(&written[1]).unwrap(), 1);
    }
}
