use mongodb::bson::{Bson, Document};

use crate::error::{Error, Result};
use crate::mongo::{Direction, FindSpec, IndexSettings, KeySpec, UpdateOutcome};

/// Options for [`EasyMongo::get`](super::EasyMongo::get).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOptions {
    pub sort: Option<KeySpec>,
    pub limit: Option<i64>,
    pub hint: Option<KeySpec>,
}

impl GetOptions {
    pub fn sort(mut self, sort: impl Into<KeySpec>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn hint(mut self, hint: impl Into<KeySpec>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// A limit of exactly one is served by a single-document read.
    pub(crate) fn is_single(&self) -> bool {
        self.limit == Some(1)
    }

    pub(crate) fn find_spec(&self) -> FindSpec {
        FindSpec {
            sort: self.sort.as_ref().map(KeySpec::to_document),
            hint: self.hint.as_ref().map(KeySpec::to_document),
            limit: self.limit,
        }
    }
}

/// Options for [`EasyMongo::get_random`](super::EasyMongo::get_random).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomOptions {
    pub sort: Option<KeySpec>,
    /// Sample size, one when unset.
    pub limit: Option<i64>,
}

impl RandomOptions {
    pub fn sort(mut self, sort: impl Into<KeySpec>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn sample_size(&self) -> i64 {
        self.limit.unwrap_or(1)
    }
}

/// What to index. Explicit `keys` win over `attribute`; one of them is
/// required.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    pub attribute: Option<String>,
    pub keys: Option<Document>,
    pub direction: Direction,
    pub unique: bool,
    pub background: bool,
}

impl Default for IndexRequest {
    fn default() -> Self {
        let settings = IndexSettings::default();
        Self {
            attribute: None,
            keys: None,
            direction: Direction::Asc,
            unique: settings.unique,
            background: settings.background,
        }
    }
}

impl IndexRequest {
    pub fn attribute(attribute: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..Self::default()
        }
    }

    pub fn keys(keys: Document) -> Self {
        Self {
            keys: Some(keys),
            ..Self::default()
        }
    }

    pub fn direction(mut self, direction: impl Into<Direction>) -> Self {
        self.direction = direction.into();
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    pub(crate) fn key_document(&self) -> Result<Document> {
        if let Some(keys) = self.keys.as_ref().filter(|k| !k.is_empty()) {
            return Ok(keys.clone());
        }
        match &self.attribute {
            Some(attribute) => Ok(KeySpec::field(attribute.clone(), self.direction).to_document()),
            None => Err(Error::MissingIndexKeys),
        }
    }

    pub(crate) fn settings(&self) -> IndexSettings {
        IndexSettings {
            unique: self.unique,
            background: self.background,
        }
    }
}

/// Which path [`EasyMongo::put`](super::EasyMongo::put) took.
#[derive(Debug, Clone, PartialEq)]
pub enum PutOutcome {
    Inserted(Bson),
    Updated(UpdateOutcome),
}
