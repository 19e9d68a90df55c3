use crate::domain_port::*;
use dashmap::DashMap;
use nanoid::nanoid;
use std::collections::BTreeMap;

const ID_ALPHABET: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b',
    'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u',
    'v', 'w', 'x', 'y', 'z',
];

/// Hosted document stores hand out 20-character alphanumeric ids.
pub fn new_document_id() -> String {
    nanoid!(20, &ID_ALPHABET)
}

/// Process-local store. Used by the `memory` backend and by tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<String, BTreeMap<String, Fields>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(None);
        };

        let found = docs
            .iter()
            .find(|(_, fields)| fields.get(field).and_then(|v| v.as_str()) == Some(value))
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            });
        Ok(found)
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, DocumentStoreError> {
        let id = new_document_id();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), DocumentStoreError> {
        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or(DocumentStoreError::NotFound)?;
        let doc = docs.get_mut(id).ok_or(DocumentStoreError::NotFound)?;
        doc.extend(fields);
        Ok(())
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }
}
