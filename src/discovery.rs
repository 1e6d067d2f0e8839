//! Discovery of endpoints announced in response text
//!
//! A response announces a new endpoint with a marker followed by the rest of
//! the line:
//!
//! ```text
//! Some reply text.
//! New LLM: summarizer-v2
//! ```
//!
//! The captured value is not validated; whatever follows the marker up to the
//! end of the line is returned. When several announcements appear, the first
//! one wins.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use fancy_regex::Regex;

use crate::config::DEFAULT_MARKER;

static DEFAULT_SCANNER: OnceLock<Option<Scanner>> = OnceLock::new();

/// Compiled announcement pattern
#[derive(Debug)]
pub struct Scanner {
    pattern: Regex,
}

impl Scanner {
    /// Build a scanner for a literal marker
    pub fn new(marker: &str) -> Result<Self> {
        let source = format!(r"{}([^\r\n]+)", fancy_regex::escape(marker));
        let pattern = Regex::new(&source)
            .with_context(|| format!("Invalid discovery marker: {}", marker))?;
        Ok(Self { pattern })
    }

    /// Return the first announced identifier in `text`, if any
    pub fn scan(&self, text: &str) -> Option<String> {
        let captures = self.pattern.captures(text).ok().flatten()?;
        captures.get(1).map(|m| m.as_str().to_string())
    }
}

/// Scan for `New LLM: <identifier>` using the default marker
pub fn scan_for_new_endpoint(text: &str) -> Option<String> {
    DEFAULT_SCANNER
        .get_or_init(|| Scanner::new(DEFAULT_MARKER).ok())
        .as_ref()?
        .scan(text)
}
