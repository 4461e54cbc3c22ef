//! Directory-based record store

use crate::etl::Loader;
use crate::records::{Domain, ExtractedRecord, Record};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Upsert-by-key JSON record store
///
/// Each record lives at `<root>/<domain>/<key>.json`; writing a record with
/// an existing key replaces it, so repeated syncs converge on one file per
/// upstream entity.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn domain_dir(&self, domain: Domain) -> PathBuf {
        self.root.join(domain.slug())
    }

    pub fn record_path(&self, domain: Domain, key: &str) -> PathBuf {
        self.domain_dir(domain).join(format!("{}.json", file_stem(key)))
    }

    /// Write one record, replacing any previous version with the same key
    pub fn upsert(&self, record: &ExtractedRecord) -> Result<PathBuf> {
        let domain = record.domain();
        let path = self.record_path(domain, &record.key());
        std::fs::create_dir_all(self.domain_dir(domain))
            .with_context(|| format!("Failed to create {}", self.domain_dir(domain).display()))?;

        let json = serde_json::to_string_pretty(record)
            .with_context(|| format!("Failed to serialize {} record {}", domain, record.key()))?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write record: {}", path.display()))?;

        log::debug!("Upserted {}", path.display().cyan());
        Ok(path)
    }

    pub fn upsert_all(&self, records: &[ExtractedRecord]) -> Result<usize> {
        for record in records {
            self.upsert(record)?;
        }
        Ok(records.len())
    }

    /// Read one record by key
    pub fn get<R: Record>(&self, key: &str) -> Result<Option<R>> {
        let path = self.record_path(R::DOMAIN, key);
        if !path.exists() {
            return Ok(None);
        }
        read_record(&path).map(Some)
    }

    /// Read every stored record of a domain, ordered by file name
    pub fn all<R: Record>(&self) -> Result<Vec<R>> {
        let mut paths = self.record_files(R::DOMAIN)?;
        paths.sort();
        paths.iter().map(|path| read_record(path)).collect()
    }

    /// Count stored records of a domain
    pub fn count(&self, domain: Domain) -> Result<usize> {
        Ok(self.record_files(domain)?.len())
    }

    fn record_files(&self, domain: Domain) -> Result<Vec<PathBuf>> {
        let dir = self.domain_dir(domain);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl Loader for RecordStore {
    type Item = ExtractedRecord;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.upsert_all(&items)
    }
}

fn read_record<R: Record>(path: &Path) -> Result<R> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record: {}", path.display()))
}

/// Keys become file names; anything outside `[A-Za-z0-9_-]` is replaced
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
