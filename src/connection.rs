//! Ownership and lazy establishment of the single client handle.
//!
//! Access is single-writer: every method that can change the handle takes
//! `&mut self`, so callers sharing a manager across tasks must synchronize
//! around it themselves.

use mongodb::bson::doc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{ConnectionConfig, DEFAULT_RETRY_BACKOFF};
use crate::error::{Error, Result};
use crate::mongo::{Connector, StoreClient};

/// Database the liveness probe runs against.
const PROBE_DATABASE: &str = "admin";

pub struct ConnectionManager<C: Connector> {
    config: ConnectionConfig,
    connector: C,
    retry_backoff: Duration,
    client: Option<C::Client>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(config: ConnectionConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            client: None,
        }
    }

    /// Fixed pause between failed attempts.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The current handle, if one is established.
    pub fn client(&self) -> Option<&C::Client> {
        self.client.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Returns the existing handle, or connects and probes the server.
    ///
    /// `max_attempts` is the total number of connect+probe attempts, with one
    /// backoff pause between consecutive attempts: `open_connection(3)` tries
    /// three times and sleeps twice. Zero is treated as one. A failure while
    /// building the client or while probing it uses up an attempt. On
    /// exhaustion the handle stays unset.
    pub async fn open_connection(&mut self, max_attempts: u32) -> Result<&C::Client> {
        let client = match self.client.take() {
            Some(client) => client,
            None => self.establish(max_attempts).await?,
        };
        Ok(&*self.client.insert(client))
    }

    /// Closes and forgets the handle. A later operation reconnects.
    pub async fn close_connection(&mut self) {
        if let Some(client) = self.client.take() {
            client.close().await;
            info!(address = %self.config.address(), "connection closed");
        }
    }

    async fn establish(&self, max_attempts: u32) -> Result<C::Client> {
        let attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.connect_and_probe().await {
                Ok(client) => {
                    info!(address = %self.config.address(), attempt, "connection established");
                    return Ok(client);
                }
                Err(err) if attempt < attempts => {
                    warn!(
                        address = %self.config.address(),
                        attempt,
                        remaining = attempts - attempt,
                        error = %err,
                        "connection attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(err) => {
                    warn!(
                        address = %self.config.address(),
                        attempts,
                        error = %err,
                        "giving up on connection"
                    );
                    return Err(Error::Connection {
                        address: self.config.address(),
                        attempts,
                        source: Box::new(err),
                    });
                }
            }
        }
    }

    /// Constructing a client does not reach the server, so a ping confirms it.
    async fn connect_and_probe(&self) -> Result<C::Client> {
        let client = self.connector.connect(&self.config).await?;
        let probe = client.run_command(PROBE_DATABASE, doc! { "ping": 1 }).await;
        if let Err(err) = probe {
            client.close().await;
            return Err(err);
        }
        Ok(client)
    }
}
