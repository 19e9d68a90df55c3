use serde_json::{Map, Value};

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("document not found")]
    NotFound,
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Minimal document-store surface. Field lookups are plain equality on a
/// string field; the store does not enforce uniqueness of any field.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Returns the generated id.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, DocumentStoreError>;

    /// Merges `fields` into an existing document. `NotFound` if `id` is absent.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), DocumentStoreError>;

    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError>;
}
