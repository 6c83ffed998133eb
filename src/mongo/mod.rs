//! The narrow store capability the facade is written against, and its
//! implementation on top of the official driver.

pub mod aggregation;
pub mod client;
pub mod crud;
pub mod cursor;
pub mod index;
pub mod query;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::target::Namespace;

pub use client::{MongoConnector, MongoStore};
pub use cursor::DocumentStream;
pub use index::IndexSettings;
pub use query::{Direction, FindSpec, KeySpec};

/// Builds a client from configuration. Construction alone is not proof that
/// the server is reachable.
#[async_trait]
pub trait Connector: Send + Sync {
    type Client: StoreClient;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Client>;
}

/// What the facade needs from a live client.
#[async_trait]
pub trait StoreClient: Send + Sync + Sized {
    async fn run_command(&self, database: &str, command: Document) -> Result<Document>;

    async fn find_one(
        &self,
        ns: &Namespace,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Option<Document>>;

    async fn find(&self, ns: &Namespace, filter: Document, spec: FindSpec)
        -> Result<DocumentStream>;

    async fn aggregate(&self, ns: &Namespace, pipeline: Vec<Document>) -> Result<DocumentStream>;

    /// Returns the inserted `_id`.
    async fn insert_one(&self, ns: &Namespace, document: Document) -> Result<Bson>;

    async fn update_one(
        &self,
        ns: &Namespace,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome>;

    /// Returns the number of removed documents.
    async fn delete_many(&self, ns: &Namespace, filter: Document) -> Result<u64>;

    async fn count_documents(&self, ns: &Namespace, filter: Document) -> Result<u64>;

    /// Returns the index name.
    async fn create_index(
        &self,
        ns: &Namespace,
        keys: Document,
        settings: IndexSettings,
    ) -> Result<String>;

    /// Shuts the transport down. Streams still held from earlier reads stop
    /// working.
    async fn close(self);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<Bson>,
}
