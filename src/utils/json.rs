use mongodb::bson::{self, Bson, Document};
use serde_json::Value;

use crate::error::Result;

/// Convert BSON Document → JSON Value (relaxed extended JSON)
pub fn document_to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}

/// Convert JSON Value → BSON Document. Only JSON objects convert.
pub fn document_from_json(value: Value) -> Result<Document> {
    Ok(bson::to_document(&value)?)
}
