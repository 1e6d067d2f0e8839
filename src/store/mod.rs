//! Endpoint list storage
//!
//! The endpoint list is a single line of comma-separated tokens. Each token is
//! either a bare URL or an `identifier:url` pair written by discovery.
//!
//! ```text
//! https://a.example/llm,https://b.example/llm,svc-c:https://a.example/llm/v1/text
//! ```
//!
//! The [`EndpointStore`] trait is the seam the driver depends on:
//! - [`FileStore`] - the flat file used in production
//! - [`MemoryStore`] - in-memory fake with identical semantics, for tests

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use anyhow::Result;

/// Storage for the known endpoint list
pub trait EndpointStore: Send + Sync {
    /// Read the first line of the list and split it on commas.
    /// A missing or empty list yields no tokens.
    fn load(&self) -> Result<Vec<String>>;

    /// Append `,<identifier>:<url>` to the list. No newline is written and
    /// existing entries are never deduplicated or rewritten.
    fn append(&self, identifier: &str, url: &str) -> Result<()>;
}

/// Split a raw list line into tokens, in order.
///
/// Empty tokens between commas are kept; a single trailing comma does not
/// produce an empty final token.
pub fn split_tokens(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
    let mut tokens: Vec<String> = line.split(',').map(String::from).collect();
    if tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    tokens
}

/// Format a discovered entry the way it is appended to the list
pub fn format_entry(identifier: &str, url: &str) -> String {
    format!(",{}:{}", identifier, url)
}

fn has_scheme(token: &str, scheme: &str) -> bool {
    token
        .get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

/// A resolved endpoint token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Name announced by discovery, if the token carried one
    pub identifier: Option<String>,
    /// Where requests go
    pub url: String,
}

impl Endpoint {
    /// Resolve a token from the list.
    ///
    /// Tokens starting with `http://` or `https://` (any case) are bare URLs. Otherwise the
    /// text before the first `:` is the identifier. Anything else is passed
    /// through unchanged as the URL.
    pub fn parse(token: &str) -> Self {
        if has_scheme(token, "https://") || has_scheme(token, "http://") {
            return Self {
                identifier: None,
                url: token.to_string(),
            };
        }

        match token.split_once(':') {
            Some((identifier, url)) if !identifier.is_empty() => Self {
                identifier: Some(identifier.to_string()),
                url: url.to_string(),
            },
            _ => Self {
                identifier: None,
                url: token.to_string(),
            },
        }
    }
}
