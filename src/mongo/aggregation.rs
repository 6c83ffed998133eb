use mongodb::bson::{doc, Document};
use mongodb::{Collection, Cursor};

pub async fn aggregate(
    collection: Collection<Document>,
    pipeline: Vec<Document>,
) -> mongodb::error::Result<Cursor<Document>> {
    collection.aggregate(pipeline, None).await
}

/// `[$match?, $sample, $sort?]`. An empty query adds no `$match` stage.
pub fn random_sample_pipeline(
    query: Option<Document>,
    size: i64,
    sort: Option<Document>,
) -> Vec<Document> {
    let mut pipeline = Vec::with_capacity(3);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        pipeline.push(doc! { "$match": query });
    }
    pipeline.push(doc! { "$sample": { "size": size } });
    if let Some(sort) = sort {
        pipeline.push(doc! { "$sort": sort });
    }
    pipeline
}
