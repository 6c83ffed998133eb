use mongodb::bson;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The connection retry budget ran out.
    #[error("could not connect to {address} after {attempts} attempt(s)")]
    Connection {
        address: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("create_index requires an attribute or a non-empty key document")]
    MissingIndexKeys,

    #[error("invalid endpoint {0:?}, expected host:port")]
    InvalidEndpoint(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidSetting { key: &'static str, value: String },

    /// No explicit name was given and no default is configured.
    #[error("no {0} name given and no default {0} configured")]
    UnresolvedTarget(&'static str),

    #[error(transparent)]
    Store(#[from] mongodb::error::Error),

    #[error("invalid document: {0}")]
    Document(#[from] bson::ser::Error),
}
