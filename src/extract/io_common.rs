use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;

use log::{debug, info, warn};
use snafu::ResultExt;

use crate::extract::*;

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The file name without its extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn read_lines(path: &Path) -> ExtractResult<Vec<String>> {
    info!("Attempting to read input file {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningInputSnafu {
        path: path.display().to_string(),
    })?;
    Ok(contents.lines().map(|l| l.to_string()).collect())
}

pub fn write_text(path: &Path, contents: &str) -> ExtractResult<()> {
    fs::write(path, contents).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })
}

pub fn create_dir(path: &Path) -> ExtractResult<()> {
    fs::create_dir_all(path).context(CreatingDirectorySnafu {
        path: path.display().to_string(),
    })
}

/// Lines and records that no rule recognized.
///
/// They are kept for a human to review, in the order they were met.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Unmatched {
    pub lines: Vec<String>,
}

impl Unmatched {
    pub fn push(&mut self, line: &str) {
        debug!("unmatched: {:?}", line);
        self.lines.push(line.to_string());
    }

    pub fn append(&mut self, other: &mut Unmatched) {
        self.lines.append(&mut other.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Writes the side file. Nothing is written when every line matched.
    pub fn write_to(&self, path: &Path) -> ExtractResult<()> {
        if self.lines.is_empty() {
            return Ok(());
        }
        write_text(path, &self.lines.join("\n"))?;
        warn!(
            "{} unmatched lines written to {}",
            self.lines.len(),
            path.display()
        );
        Ok(())
    }
}

/// The files of a directory with the given extension, sorted by name.
pub fn list_files(dir: &Path, extension: &str) -> ExtractResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).context(OpeningInputSnafu {
        path: dir.display().to_string(),
    })?;
    let mut res: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.context(OpeningInputSnafu {
            path: dir.display().to_string(),
        })?;
        let p = entry.path();
        if p.is_file() && p.extension().map(|e| e == extension).unwrap_or(false) {
            res.push(p);
        }
    }
    res.sort();
    Ok(res)
}

/// The subdirectories of a directory, sorted by name.
pub fn list_dirs(dir: &Path) -> ExtractResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).context(OpeningInputSnafu {
        path: dir.display().to_string(),
    })?;
    let mut res: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.context(OpeningInputSnafu {
            path: dir.display().to_string(),
        })?;
        if entry.path().is_dir() {
            res.push(entry.path());
        }
    }
    res.sort();
    Ok(res)
}

/// Runs the job over all the items with a fixed number of worker threads.
///
/// Items are independent: the results come back in completion order and a
/// job is expected to deal with its own failures.
pub fn run_pool<T, R, F>(items: Vec<T>, workers: usize, job: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let num_workers = workers.max(1).min(items.len().max(1));
    debug!(
        "run_pool: {} items on {} workers",
        items.len(),
        num_workers
    );
    let queue: Mutex<VecDeque<T>> = Mutex::new(VecDeque::from(items));
    let results: Mutex<Vec<R>> = Mutex::new(Vec::new());
    thread::scope(|s| {
        for _ in 0..num_workers {
            let queue = &queue;
            let results = &results;
            let job = &job;
            s.spawn(move || loop {
                let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                let item = match next {
                    Some(x) => x,
                    None => break,
                };
                let r = job(item);
                results.lock().unwrap_or_else(|e| e.into_inner()).push(r);
            });
        }
    });
    results.into_inner().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_runs_every_item() {
        let items: Vec<u32> = (1..=20).collect();
        let mut res = run_pool(items, 4, |x| x * 2);
        res.sort_unstable();
        let expected: Vec<u32> = (1..=20).map(|x| x * 2).collect();
        assert_eq!(res, expected);
    }

    #[test]
    fn pool_failures_do_not_stop_siblings() {
        let items: Vec<u32> = (1..=6).collect();
        let res: Vec<Result<u32, String>> = run_pool(items, 3, |x| {
            if x == 3 {
                Err(format!("item {} failed", x))
            } else {
                Ok(x)
            }
        });
        assert_eq!(res.len(), 6);
        assert_eq!(res.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn pool_with_no_items() {
        let res: Vec<u32> = run_pool(Vec::<u32>::new(), 4, |x| x);
        assert!(res.is_empty());
    }

    #[test]
    fn unmatched_file_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("unmatched.txt");
        let mut u = Unmatched::default();
        u.write_to(&p).unwrap();
        assert!(!p.exists());
        u.push("Registered Voters 1234");
        u.push("???");
        u.write_to(&p).unwrap();
        assert_eq!(
            fs::read_to_string(&p).unwrap(),
            "Registered Voters 1234\n???"
        );
    }
}
