//! Driver loop
//!
//! One pass over the stored endpoint list, in order:
//!
//! 1. POST the payload to the endpoint
//! 2. On an error or an empty body, move on to the next endpoint
//! 3. Otherwise log the exchange and scan the body for an announcement
//! 4. Append any announced endpoint to the store as
//!    `<identifier>:<sender url><route suffix>`
//!
//! Entries appended during a run are not visited until the next run.
//!
//! Only 2xx bodies are scanned. The body of a non-2xx response travels in
//! [`RequestError::Status`] and is never searched for announcements.

use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::client::{RequestClient, RequestError, Transport, TransportError};
use crate::config::Config;
use crate::discovery::Scanner;
use crate::exchange_log::{ErrorLog, ExchangeLog};
use crate::store::{Endpoint, EndpointStore};

/// An endpoint recorded during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub identifier: String,
    pub url: String,
}

/// Counts for one pass over the endpoint list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Endpoints a send was attempted for (one per stored token)
    pub attempted: usize,
    /// Endpoints that returned a non-empty body
    pub responded: usize,
    /// Endpoints that returned an empty body
    pub empty: usize,
    /// Endpoints whose request was rejected or failed
    pub failed: usize,
    /// Endpoints appended to the store
    pub discovered: Vec<Discovery>,
}

/// Unwrap a freshly built transport. A transport that failed to build is
/// recorded in the error log and mapped to exit status 1, so no request is
/// ever attempted.
pub fn require_transport<T>(init: Result<T, TransportError>, config: &Config) -> Result<T, ExitCode> {
    init.map_err(|e| {
        error!("{}", e);
        ErrorLog::new(&config.files.error_log).record(e.to_string());
        ExitCode::FAILURE
    })
}

pub struct Driver<S, T> {
    store: S,
    client: RequestClient<T>,
    exchange_log: ExchangeLog,
    errors: ErrorLog,
    scanner: Scanner,
    payload: String,
    route_suffix: String,
}

impl<S: EndpointStore, T: Transport> Driver<S, T> {
    /// Wire a driver from settings. Logs go to the configured files.
    pub fn from_config(store: S, transport: T, config: &Config) -> Result<Self> {
        let errors = ErrorLog::new(&config.files.error_log);
        Ok(Self {
            store,
            client: RequestClient::new(transport, &config.request, errors.clone()),
            exchange_log: ExchangeLog::new(&config.files.log),
            errors,
            scanner: Scanner::new(&config.discovery.marker)?,
            payload: config.request.payload.clone(),
            route_suffix: config.discovery.route_suffix.clone(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn client(&self) -> &RequestClient<T> {
        &self.client
    }

    /// Visit every stored endpoint once
    pub async fn run(&self) -> Result<RunSummary> {
        let tokens = self.store.load()?;
        info!("Loaded {} endpoints", tokens.len());

        let mut summary = RunSummary::default();
        for token in &tokens {
            summary.attempted += 1;
            let endpoint = Endpoint::parse(token);

            // Failures are already recorded by the client
            let Ok(response) = self.client.send_request(&endpoint.url, &self.payload).await else {
                summary.failed += 1;
                continue;
            };

            if response.is_empty() {
                warn!("No response from {}", token);
                summary.empty += 1;
                continue;
            }
            summary.responded += 1;

            self.exchange_log.log(token, "", &self.payload);

            if let Some(identifier) = self.scanner.scan(&response) {
                let url = format!("{}{}", endpoint.url, self.route_suffix);
                match self.store.append(&identifier, &url) {
                    Ok(()) => {
                        info!("Discovered {} via {}", identifier, token);
                        summary.discovered.push(Discovery { identifier, url });
                    }
                    Err(e) => {
                        error!("Failed to record {}: {:#}", identifier, e);
                        self.errors
                            .record(format!("Failed to record {}: {:#}", identifier, e));
                    }
                }
            }
        }

        info!(
            "Run finished: {} attempted, {} responded, {} empty, {} failed, {} discovered",
            summary.attempted,
            summary.responded,
            summary.empty,
            summary.failed,
            summary.discovered.len()
        );
        Ok(summary)
    }

    /// Send the payload to `from`, forward its answer to `to`, and log the
    /// exchange. Returns the answer from `to`.
    pub async fn relay(&self, from: &str, to: &str) -> Result<String, RequestError> {
        let from_url = Endpoint::parse(from).url;
        let to_url = Endpoint::parse(to).url;

        let response = self
            .client
            .send_output(&from_url, &to_url, &self.payload)
            .await?;
        self.exchange_log.log(from, to, &self.payload);
        Ok(response)
    }
}
