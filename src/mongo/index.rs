use mongodb::bson::Document;
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    pub unique: bool,
    pub background: bool,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            unique: false,
            background: true,
        }
    }
}

pub async fn create_index(
    collection: Collection<Document>,
    keys: Document,
    settings: IndexSettings,
) -> mongodb::error::Result<String> {
    let mut options = IndexOptions::default();
    options.unique = Some(settings.unique);
    options.background = Some(settings.background);

    let index_model = IndexModel::builder()
        .keys(keys)
        .options(options)
        .build();

    let created = collection.create_index(index_model, None).await?;

    Ok(created.index_name)
}
