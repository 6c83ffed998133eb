use mongodb::bson::{doc, Document};
use mongodb::options::{FindOneOptions, FindOptions, Hint};
use mongodb::{Collection, Cursor};
use serde::Deserialize;

/// Sort and index direction. Anything other than `"desc"` reads as ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_i32(self) -> i32 {
        match self {
            Direction::Asc => 1,
            Direction::Desc => -1,
        }
    }
}

impl From<&str> for Direction {
    fn from(value: &str) -> Self {
        if value == "desc" {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }
}

/// Keys for a sort, a hint or an index: either a raw key document or a single
/// attribute with a direction.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySpec {
    Keys(Document),
    Field { attribute: String, direction: Direction },
}

impl KeySpec {
    pub fn field(attribute: impl Into<String>, direction: impl Into<Direction>) -> Self {
        KeySpec::Field {
            attribute: attribute.into(),
            direction: direction.into(),
        }
    }

    pub fn ascending(attribute: impl Into<String>) -> Self {
        Self::field(attribute, Direction::Asc)
    }

    pub fn descending(attribute: impl Into<String>) -> Self {
        Self::field(attribute, Direction::Desc)
    }

    pub fn to_document(&self) -> Document {
        match self {
            KeySpec::Keys(keys) => keys.clone(),
            KeySpec::Field {
                attribute,
                direction,
            } => doc! { attribute.as_str(): direction.as_i32() },
        }
    }
}

impl From<Document> for KeySpec {
    fn from(keys: Document) -> Self {
        KeySpec::Keys(keys)
    }
}

/// Options of a cursor-style read, already in store vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindSpec {
    pub sort: Option<Document>,
    pub hint: Option<Document>,
    pub limit: Option<i64>,
}

pub async fn find_one(
    collection: Collection<Document>,
    filter: Document,
    sort: Option<Document>,
) -> mongodb::error::Result<Option<Document>> {
    let mut options = FindOneOptions::default();
    options.sort = sort;
    collection.find_one(filter, options).await
}

pub async fn find_with_options(
    collection: Collection<Document>,
    filter: Document,
    spec: FindSpec,
) -> mongodb::error::Result<Cursor<Document>> {
    let mut options = FindOptions::default();
    options.sort = spec.sort;
    options.hint = spec.hint.map(Hint::Keys);
    options.limit = spec.limit;
    collection.find(filter, options).await
}
