use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use mongodb::options::{ClientOptions, ServerAddress};
use mongodb::{Client, Collection};
use tracing::debug;

use super::{aggregation, crud, cursor, index, query};
use super::{Connector, DocumentStream, FindSpec, IndexSettings, StoreClient, UpdateOutcome};
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::target::Namespace;

/// Connects through the official driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    type Client = MongoStore;

    async fn connect(&self, config: &ConnectionConfig) -> Result<MongoStore> {
        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: config.host().to_string(),
            port: Some(config.port()),
        }];
        options.app_name = config.app_name().map(str::to_string);
        options.server_selection_timeout = config.server_selection_timeout();

        let client = Client::with_options(options)?;

        Ok(MongoStore { client })
    }
}

/// A driver `Client` seen through [`StoreClient`].
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The driver client, for anything the facade does not wrap.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    fn collection(&self, ns: &Namespace) -> Collection<Document> {
        self.client
            .database(&ns.database)
            .collection::<Document>(&ns.collection)
    }
}

#[async_trait]
impl StoreClient for MongoStore {
    async fn run_command(&self, database: &str, command: Document) -> Result<Document> {
        Ok(self.client.database(database).run_command(command, None).await?)
    }

    async fn find_one(
        &self,
        ns: &Namespace,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Option<Document>> {
        Ok(query::find_one(self.collection(ns), filter, sort).await?)
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: Document,
        spec: FindSpec,
    ) -> Result<DocumentStream> {
        let found = query::find_with_options(self.collection(ns), filter, spec).await?;
        Ok(cursor::from_cursor(found))
    }

    async fn aggregate(&self, ns: &Namespace, pipeline: Vec<Document>) -> Result<DocumentStream> {
        let found = aggregation::aggregate(self.collection(ns), pipeline).await?;
        Ok(cursor::from_cursor(found))
    }

    async fn insert_one(&self, ns: &Namespace, document: Document) -> Result<Bson> {
        let result = crud::insert_one(self.collection(ns), document).await?;
        Ok(result.inserted_id)
    }

    async fn update_one(
        &self,
        ns: &Namespace,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        let result = crud::update_one(self.collection(ns), filter, update, Some(upsert)).await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_many(&self, ns: &Namespace, filter: Document) -> Result<u64> {
        let result = crud::delete_many(self.collection(ns), filter).await?;
        Ok(result.deleted_count)
    }

    async fn count_documents(&self, ns: &Namespace, filter: Document) -> Result<u64> {
        Ok(crud::count_documents(self.collection(ns), filter).await?)
    }

    async fn create_index(
        &self,
        ns: &Namespace,
        keys: Document,
        settings: IndexSettings,
    ) -> Result<String> {
        Ok(index::create_index(self.collection(ns), keys, settings).await?)
    }

    async fn close(self) {
        // Cursors and `inner()` clones share this client, so dropping it alone
        // would leave the pool open.
        debug!("shutting down driver client");
        self.client.shutdown_immediate().await;
    }
}
