//! The operation facade: every data operation resolves its target, makes sure
//! the connection is open and delegates to the store.

mod options;

pub use options::{GetOptions, IndexRequest, PutOutcome, RandomOptions};

use mongodb::bson::{Bson, Document};
use tracing::debug;

use crate::config::{ConnectionConfig, Settings};
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::mongo::{
    aggregation, crud, cursor, Connector, DocumentStream, MongoConnector, StoreClient,
    UpdateOutcome,
};
use crate::target::{Defaults, Namespace, Target};

/// One logical database handle plus default targets.
///
/// Not internally synchronized: operations take `&mut self` because any of
/// them may open the connection.
pub struct EasyMongo<C: Connector = MongoConnector> {
    connection: ConnectionManager<C>,
    defaults: Defaults,
    connect_attempts: u32,
}

impl EasyMongo<MongoConnector> {
    /// Builds a facade over the official driver. Connects right away when
    /// `settings.connect` is set.
    pub async fn new(settings: Settings) -> Result<Self> {
        Self::with_connector(settings, MongoConnector).await
    }

    pub async fn from_env() -> Result<Self> {
        Self::new(Settings::from_env()?).await
    }
}

impl<C: Connector> EasyMongo<C> {
    pub async fn with_connector(settings: Settings, connector: C) -> Result<Self> {
        let config = settings.connection_config()?;
        let mut facade = Self {
            connection: ConnectionManager::new(config, connector)
                .with_retry_backoff(settings.retry_backoff()),
            defaults: settings.defaults(),
            connect_attempts: settings.connect_attempts,
        };

        if settings.connect {
            facade.open_connection(settings.connect_attempts).await?;
        }

        Ok(facade)
    }

    /// The live store handle, if connected.
    pub fn client(&self) -> Option<&C::Client> {
        self.connection.client()
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.connection.config()
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Replaces the default database. The default collection only changes
    /// when one is given.
    pub fn set_defaults(&mut self, database: impl Into<String>, collection: Option<&str>) {
        self.defaults.database = Some(database.into());
        if let Some(collection) = collection {
            self.defaults.collection = Some(collection.to_string());
        }
    }

    pub async fn open_connection(&mut self, max_attempts: u32) -> Result<()> {
        self.connection.open_connection(max_attempts).await?;
        Ok(())
    }

    pub async fn close_connection(&mut self) {
        self.connection.close_connection().await;
    }

    pub async fn exists(&mut self, query: Document, target: Target) -> Result<bool> {
        let (client, ns) = self.store(&target).await?;
        Ok(client.find_one(&ns, query, None).await?.is_some())
    }

    /// Fails with [`Error::MissingIndexKeys`](crate::Error::MissingIndexKeys)
    /// before connecting when the request names no keys.
    pub async fn create_index(&mut self, request: IndexRequest, target: Target) -> Result<String> {
        let keys = request.key_document()?;
        let (client, ns) = self.store(&target).await?;
        debug!(%ns, ?keys, "creating index");
        client.create_index(&ns, keys, request.settings()).await
    }

    /// A missing query matches everything. With a limit of one the result
    /// holds at most one document; otherwise it is read from a cursor.
    pub async fn get(
        &mut self,
        query: Option<Document>,
        target: Target,
        options: GetOptions,
    ) -> Result<DocumentStream> {
        let (client, ns) = self.store(&target).await?;
        let filter = query.unwrap_or_default();

        if options.is_single() {
            let sort = options.sort.as_ref().map(|s| s.to_document());
            let found = client.find_one(&ns, filter, sort).await?;
            return Ok(cursor::from_documents(found.into_iter().collect()));
        }

        client.find(&ns, filter, options.find_spec()).await
    }

    /// Reads everything `get` would, then closes the connection.
    pub async fn get_and_close(
        &mut self,
        query: Option<Document>,
        target: Target,
        options: GetOptions,
    ) -> Result<Vec<Document>> {
        let found = self.get(query, target, options).await?;
        let documents = cursor::collect_documents(found).await?;
        self.close_connection().await;
        Ok(documents)
    }

    /// A random sample of `options.limit` (default one) matching documents.
    pub async fn get_random(
        &mut self,
        query: Option<Document>,
        target: Target,
        options: RandomOptions,
    ) -> Result<DocumentStream> {
        let (client, ns) = self.store(&target).await?;
        let pipeline = aggregation::random_sample_pipeline(
            query,
            options.sample_size(),
            options.sort.as_ref().map(|s| s.to_document()),
        );
        client.aggregate(&ns, pipeline).await
    }

    /// Sets the fields of `value` on the first match, inserting when nothing
    /// matches.
    pub async fn update(
        &mut self,
        query: Document,
        value: Document,
        target: Target,
    ) -> Result<UpdateOutcome> {
        let (client, ns) = self.store(&target).await?;
        client
            .update_one(&ns, query, crud::set_update(value), true)
            .await
    }

    /// Appends `values` to the array at `key` on the first match.
    pub async fn push(
        &mut self,
        query: Document,
        key: &str,
        values: Vec<Bson>,
        target: Target,
    ) -> Result<UpdateOutcome> {
        let (client, ns) = self.store(&target).await?;
        client
            .update_one(&ns, query, crud::push_update(key, values), false)
            .await
    }

    /// `update` when a query is given, `insert` otherwise.
    pub async fn put(
        &mut self,
        value: Document,
        query: Option<Document>,
        target: Target,
    ) -> Result<PutOutcome> {
        match query {
            Some(query) => Ok(PutOutcome::Updated(self.update(query, value, target).await?)),
            None => Ok(PutOutcome::Inserted(self.insert(value, target).await?)),
        }
    }

    /// Removes every match. A missing query removes everything.
    pub async fn remove(&mut self, query: Option<Document>, target: Target) -> Result<u64> {
        let (client, ns) = self.store(&target).await?;
        client.delete_many(&ns, query.unwrap_or_default()).await
    }

    pub async fn insert(&mut self, value: Document, target: Target) -> Result<Bson> {
        let (client, ns) = self.store(&target).await?;
        client.insert_one(&ns, value).await
    }

    pub async fn count(&mut self, query: Option<Document>, target: Target) -> Result<u64> {
        let (client, ns) = self.store(&target).await?;
        client.count_documents(&ns, query.unwrap_or_default()).await
    }

    async fn store(&mut self, target: &Target) -> Result<(&C::Client, Namespace)> {
        let client = self.connection.open_connection(self.connect_attempts).await?;
        let ns = target.resolve(&self.defaults).into_namespace()?;
        debug!(%ns, "resolved target");
        Ok((client, ns))
    }
}
