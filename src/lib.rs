//! Work easier with MongoDB.
//!
//! [`EasyMongo`] wraps a single lazily opened client, resolves the database
//! and collection of every call against configurable defaults, and exposes a
//! handful of simplified query, update and index helpers.
//!
//! ```no_run
//! use easy_mongo::{EasyMongo, GetOptions, KeySpec, Settings, Target};
//! use futures::TryStreamExt;
//! use mongodb::bson::doc;
//!
//! # async fn run() -> easy_mongo::Result<()> {
//! let settings = Settings::endpoint("localhost:27017").with_defaults("app", Some("users"));
//! let mut db = EasyMongo::new(settings).await?;
//!
//! db.put(doc! { "name": "ada", "age": 36 }, None, Target::default()).await?;
//! let oldest: Vec<_> = db
//!     .get(None, Target::default(), GetOptions::default().sort(KeySpec::descending("age")).limit(10))
//!     .await?
//!     .try_collect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod facade;
pub mod mongo;
pub mod target;
pub mod utils;

pub use config::{ConnectionConfig, Settings};
pub use connection::ConnectionManager;
pub use error::{Error, Result};
pub use facade::{EasyMongo, GetOptions, IndexRequest, PutOutcome, RandomOptions};
pub use mongo::{
    Connector, Direction, DocumentStream, KeySpec, MongoConnector, MongoStore, StoreClient,
    UpdateOutcome,
};
pub use target::{resolve, Defaults, Namespace, ResolvedTarget, Target};
pub use utils::json;
