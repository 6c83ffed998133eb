use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use mongodb::bson::Document;
use mongodb::Cursor;

use crate::error::{Error, Result};

/// A lazily produced sequence of documents.
pub type DocumentStream = BoxStream<'static, Result<Document>>;

pub fn from_cursor(cursor: Cursor<Document>) -> DocumentStream {
    cursor.map_err(Error::from).boxed()
}

pub fn from_documents(documents: Vec<Document>) -> DocumentStream {
    stream::iter(documents.into_iter().map(Ok)).boxed()
}

/// Drains the stream, stopping at the first error.
pub async fn collect_documents(documents: DocumentStream) -> Result<Vec<Document>> {
    documents.try_collect().await
}
