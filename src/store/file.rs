//! Flat-file endpoint store

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::debug;

use super::{format_entry, split_tokens, EndpointStore};

/// Endpoint list backed by a single text file.
///
/// Appends take an advisory exclusive lock so two connectors writing the same
/// file do not interleave their entries.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EndpointStore for FileStore {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            debug!("Endpoint list {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open endpoint list: {}", self.path.display()))?;
        let mut line = String::new();
        BufReader::new(file)
            .read_line(&mut line)
            .with_context(|| format!("Failed to read endpoint list: {}", self.path.display()))?;

        Ok(split_tokens(&line))
    }

    fn append(&self, identifier: &str, url: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open endpoint list: {}", self.path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to lock endpoint list: {}", self.path.display()))?;

        let written = file
            .write_all(format_entry(identifier, url).as_bytes())
            .and_then(|_| file.flush());

        // Released on drop as well; unlock explicitly so errors surface in order
        FileExt::unlock(&file)
            .with_context(|| format!("Failed to unlock endpoint list: {}", self.path.display()))?;

        written.with_context(|| format!("Failed to append to endpoint list: {}", self.path.display()))?;
        debug!("Appended {} -> {} to {}", identifier, url, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("config.txt"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_reads_first_line_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.txt");
        std::fs::write(&path, "https://a,https://b\nhttps://ignored\n").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.load().unwrap(), vec!["https://a", "https://b"]);
    }

    #[test]
    fn test_append_is_additive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.txt");
        std::fs::write(&path, "https://svcA").unwrap();
        let before = std::fs::read(&path).unwrap();

        let store = FileStore::new(&path);
        store.append("svcB", "https://svcA/v1/text").unwrap();

        let after = std::fs::read(&path).unwrap();
        assert!(after.starts_with(&before));
        assert_eq!(
            String::from_utf8(after).unwrap(),
            "https://svcA,svcB:https://svcA/v1/text"
        );
    }

    #[test]
    fn test_append_does_not_deduplicate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.txt");
        std::fs::write(&path, "https://a").unwrap();

        let store = FileStore::new(&path);
        store.append("b", "https://a/v1/text").unwrap();
        store.append("b", "https://a/v1/text").unwrap();

        assert_eq!(
            store.load().unwrap(),
            vec!["https://a", "b:https://a/v1/text", "b:https://a/v1/text"]
        );
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.txt");

        let store = FileStore::new(&path);
        store.append("x", "https://y").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), ",x:https://y");
        // The leading comma leaves an empty first token
        assert_eq!(store.load().unwrap(), vec!["", "x:https://y"]);
    }
}
