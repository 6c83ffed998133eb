use mongodb::bson::{doc, Bson, Document};
use mongodb::options::UpdateOptions;
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use mongodb::Collection;

pub async fn insert_one(
    collection: Collection<Document>,
    document: Document,
) -> mongodb::error::Result<InsertOneResult> {
    collection.insert_one(document, None).await
}

pub async fn update_one(
    collection: Collection<Document>,
    filter: Document,
    update: Document,
    upsert: Option<bool>,
) -> mongodb::error::Result<UpdateResult> {
    let mut options = UpdateOptions::default();
    if let Some(upsert_val) = upsert {
        options.upsert = Some(upsert_val);
    }
    collection.update_one(filter, update, Some(options)).await
}

pub async fn delete_many(
    collection: Collection<Document>,
    filter: Document,
) -> mongodb::error::Result<DeleteResult> {
    collection.delete_many(filter, None).await
}

pub async fn count_documents(
    collection: Collection<Document>,
    filter: Document,
) -> mongodb::error::Result<u64> {
    collection.count_documents(filter, None).await
}

/// Merges `value` into the matched document.
pub fn set_update(value: Document) -> Document {
    doc! { "$set": value }
}

/// Appends every element of `values` to the array at `key`.
pub fn push_update(key: &str, values: Vec<Bson>) -> Document {
    doc! { "$push": { key: { "$each": values } } }
}
