//! In-memory endpoint store

use std::sync::Mutex;

use anyhow::{anyhow, Result};

use super::{format_entry, split_tokens, EndpointStore};

/// Endpoint list held in memory, with the same read/append semantics as
/// [`super::FileStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: Mutex<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose backing text is `content`
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(content.into()),
        }
    }

    /// Current backing text
    pub fn contents(&self) -> String {
        self.content
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl EndpointStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>> {
        let content = self
            .content
            .lock()
            .map_err(|_| anyhow!("endpoint store lock poisoned"))?;
        let first_line = content.split('\n').next().unwrap_or("");
        Ok(split_tokens(first_line))
    }

    fn append(&self, identifier: &str, url: &str) -> Result<()> {
        let mut content = self
            .content
            .lock()
            .map_err(|_| anyhow!("endpoint store lock poisoned"))?;
        content.push_str(&format_entry(identifier, url));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());

        let store = MemoryStore::with_content("https://a,https://b\nrest");
        assert_eq!(store.load().unwrap(), vec!["https://a", "https://b"]);

        store.append("c", "https://a/v1/text").unwrap();
        assert_eq!(store.contents(), "https://a,https://b\nrest,c:https://a/v1/text");
    }
}
