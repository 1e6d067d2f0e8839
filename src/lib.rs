//! llm-connector - send a payload to a list of LLM endpoints
//!
//! Reads a comma-separated endpoint list, POSTs a fixed payload to each entry
//! in turn, logs every answered exchange and appends endpoints announced in
//! the responses (`New LLM: <identifier>`) back to the list.
//!
//! # Example
//!
//! ```no_run
//! use llm_connector::{Config, Driver, FileStore, HttpTransport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let transport = HttpTransport::new(config.request.timeout())?;
//!     let store = FileStore::new(&config.files.endpoints);
//!
//!     let driver = Driver::from_config(store, transport, &config)?;
//!     let summary = driver.run().await?;
//!     println!("{} endpoints answered", summary.responded);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod discovery;
mod driver;
mod exchange_log;
mod store;

// Re-export the public API
pub use client::{
    HttpTransport, RequestClient, RequestError, Transport, TransportError, TransportResponse,
};
pub use config::{Config, DiscoveryConfig, FilesConfig, RequestConfig};
pub use discovery::{scan_for_new_endpoint, Scanner};
pub use driver::{require_transport, Discovery, Driver, RunSummary};
pub use exchange_log::{format_exchange, ErrorLog, ExchangeLog};
pub use store::{split_tokens, Endpoint, EndpointStore, FileStore, MemoryStore};
