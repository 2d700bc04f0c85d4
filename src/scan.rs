use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::{self, StoreSource};
use crate::tune::{self, Tune};

const TUNE_EXTENSION: &str = "abc";

/// A numbered folder under the books root and the ABC files in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub number: i64,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildMode {
    /// Clear, then commit every file separately. A failure leaves the tunes
    /// of the files processed so far.
    PerFile,
    /// Clear and insert everything in one transaction. A failure keeps the
    /// previous contents.
    Atomic,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStat {
    pub books: usize,
    pub files: usize,
    pub tunes: usize,
}

impl ScanStat {
    fn add_file(&mut self, tunes: usize) {
        self.files += 1;
        self.tunes += tunes;
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        entries.push(entry.map_err(|e| Error::io(dir, e))?);
    }

    entries.sort_by_key(|e| e.file_name());

    Ok(entries)
}

fn book_number(name: &str) -> Option<i64> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match name.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("book folder '{}' is out of range, skipping", name);
            None
        }
    }
}

/// Lists the numbered book folders directly under `root`, ascending by
/// number, each with its `.abc` files sorted by name.
pub fn find_books(root: &Path) -> Result<Vec<Book>> {
    let mut books = Vec::new();

    for entry in sorted_entries(root)? {
        let dir = entry.path();

        if !dir.is_dir() {
            continue;
        }

        let number = match entry.file_name().to_str().and_then(book_number) {
            Some(n) => n,
            None => {
                trace!("skipping folder '{}'", dir.to_string_lossy());
                continue;
            }
        };

        let mut files = Vec::new();

        for file in sorted_entries(&dir)? {
            let path = file.path();

            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(TUNE_EXTENSION)
            {
                files.push(path);
            } else {
                trace!("skipping '{}'", path.to_string_lossy());
            }
        }

        debug!(
            "book {} in '{}' with {} files",
            number,
            dir.to_string_lossy(),
            files.len()
        );

        books.push(Book { number, files });
    }

    books.sort_by_key(|b| b.number);

    Ok(books)
}

/// Reads and parses one file. `file_path` in the tunes is `path` relative to
/// `root`.
pub fn read_tune_file(root: &Path, path: &Path, book: i64) -> Result<Vec<Tune>> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => Error::Decode {
            path: path.to_path_buf(),
        },
        _ => Error::io(path, e),
    })?;

    let relative = path.strip_prefix(root).unwrap_or(path);
    let file_path = relative
        .iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    debug!("parsing '{}'", file_path);

    Ok(tune::parse_text(&text, book, &file_path))
}

/// Replaces the contents of the store with the tunes found under `root`.
pub fn rebuild(source: &StoreSource, root: &Path, mode: RebuildMode) -> Result<ScanStat> {
    info!("rebuilding from '{}' ({:?})", root.to_string_lossy(), mode);

    let start_instant = Instant::now();

    let books = find_books(root)?;
    let mut stat = ScanStat {
        books: books.len(),
        ..Default::default()
    };

    let mut db = source.get()?;

    match mode {
        RebuildMode::PerFile => {
            db.clear_all()?;

            for book in &books {
                for path in &book.files {
                    let tunes = read_tune_file(root, path, book.number)?;
                    db.insert_many(&tunes)?;
                    stat.add_file(tunes.len());
                }
            }
        }
        RebuildMode::Atomic => {
            let tx = db.connection_mut().transaction()?;
            store::clear_all(&tx)?;

            for book in &books {
                for path in &book.files {
                    let tunes = read_tune_file(root, path, book.number)?;
                    store::insert_many(&tx, &tunes)?;
                    stat.add_file(tunes.len());
                }
            }

            tx.commit()?;
        }
    }

    info!(
        "done in {}ms: {} books, {} files, {} tunes",
        start_instant.elapsed().as_millis(),
        stat.books,
        stat.files,
        stat.tunes
    );

    Ok(stat)
}
