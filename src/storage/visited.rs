use crate::storage::{StorageResult, VisitedLedger};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Visited ledger backed by an append-only newline-delimited file
///
/// The whole file is read into memory at startup; `add` appends to the file
/// before returning, so membership survives process restarts.
pub struct FileVisitedLedger {
    path: PathBuf,
    urls: HashSet<String>,
}

impl FileVisitedLedger {
    /// Opens a ledger, loading any existing entries
    ///
    /// A missing file means an empty ledger; it is created on first `add`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut urls = HashSet::new();
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for line in reader.lines() {
                let line = line?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    urls.insert(trimmed.to_string());
                }
            }
            tracing::info!("Loaded {} visited URLs from {}", urls.len(), path.display());
        } else {
            tracing::info!("No visited ledger at {}, starting empty", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            urls,
        })
    }
}

impl VisitedLedger for FileVisitedLedger {
    fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    fn add(&mut self, url: &str) -> StorageResult<()> {
        if !self.urls.insert(url.to_string()) {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", url)?;
        file.flush()?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.urls.len()
    }
}
