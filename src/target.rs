//! Database/collection resolution against configured defaults.
//!
//! Presence is decided by `Option`, never by emptiness: an explicit `""` is an
//! explicit name and is passed through as such.

use std::fmt;

use crate::error::{Error, Result};

/// Names used when an operation does not say where it acts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub database: Option<String>,
    pub collection: Option<String>,
}

/// The per-call override of the defaults. `Target::default()` means
/// "use the defaults for both".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub database: Option<String>,
    pub collection: Option<String>,
}

impl Target {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            collection: Some(collection.into()),
        }
    }

    pub fn database(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            collection: None,
        }
    }

    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            database: None,
            collection: Some(collection.into()),
        }
    }

    pub fn resolve(&self, defaults: &Defaults) -> ResolvedTarget {
        resolve(self.database.as_deref(), self.collection.as_deref(), defaults)
    }
}

/// The effective pair for one call. Either side may still be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub database: Option<String>,
    pub collection: Option<String>,
}

impl ResolvedTarget {
    /// Requires both names, which every store call does.
    pub fn into_namespace(self) -> Result<Namespace> {
        Ok(Namespace {
            database: self.database.ok_or(Error::UnresolvedTarget("database"))?,
            collection: self.collection.ok_or(Error::UnresolvedTarget("collection"))?,
        })
    }
}

/// Explicit names win; otherwise the defaults (which may be absent) apply.
pub fn resolve(
    database: Option<&str>,
    collection: Option<&str>,
    defaults: &Defaults,
) -> ResolvedTarget {
    ResolvedTarget {
        database: database.map(str::to_string).or_else(|| defaults.database.clone()),
        collection: collection
            .map(str::to_string)
            .or_else(|| defaults.collection.clone()),
    }
}

/// A fully named collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}
