use crate::domain_port::*;
use crate::infra_memory::new_document_id;
use anyhow::anyhow;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, Script};
use std::collections::BTreeMap;
use tracing::warn;

const UPDATE_FIELDS: &str = include_str!("update_fields.lua");
const INSERT_ATTEMPTS: usize = 3;

/// Each collection is one Redis hash mapping document id to a JSON object.
pub struct RedisDocumentStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisDocumentStore {
    pub fn new(conn: ConnectionManager, prefix: String) -> Self {
        RedisDocumentStore { conn, prefix }
    }

    pub async fn connect(url: &str, prefix: String) -> Result<Self, DocumentStoreError> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let conn = client.get_connection_manager().await.map_err(store_error)?;
        Ok(Self::new(conn, prefix))
    }

    fn key(&self, collection: &str) -> String {
        format!("{}:{}", self.prefix, collection)
    }

    fn decode(id: String, raw: &str) -> Result<Document, DocumentStoreError> {
        let fields: Fields = serde_json::from_str(raw)
            .map_err(|e| DocumentStoreError::Malformed(format!("{}: {}", id, e)))?;
        Ok(Document { id, fields })
    }

    /// Raw documents of a collection, ordered by id.
    async fn load(&self, collection: &str) -> Result<BTreeMap<String, String>, DocumentStoreError> {
        let mut conn = self.conn.clone();
        conn.hgetall(self.key(collection))
            .await
            .map_err(store_error)
    }

    /// First document, by id order, whose `field` equals `value`. Documents
    /// that do not decode are skipped so one bad entry cannot block lookups.
    fn first_match(raw: BTreeMap<String, String>, field: &str, value: &str) -> Option<Document> {
        raw.into_iter()
            .filter_map(|(id, raw)| match Self::decode(id, &raw) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable document");
                    None
                }
            })
            .find(|doc| doc.str_field(field) == Some(value))
    }
}

fn store_error(e: RedisError) -> DocumentStoreError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_timeout() || e.is_connection_dropped()
    {
        DocumentStoreError::Unavailable(e.to_string())
    } else {
        DocumentStoreError::InternalError(anyhow!(e))
    }
}

#[async_trait::async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let raw = self.load(collection).await?;
        Ok(Self::first_match(raw, field, value))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, DocumentStoreError> {
        let key = self.key(collection);
        let raw = serde_json::to_string(&fields).map_err(|e| anyhow!(e))?;
        let mut conn = self.conn.clone();

        for _ in 0..INSERT_ATTEMPTS {
            let id = new_document_id();
            let created: bool = conn.hset_nx(&key, &id, &raw).await.map_err(store_error)?;
            if created {
                return Ok(id);
            }
        }

        Err(DocumentStoreError::InternalError(anyhow!(
            "could not allocate a document id in {}",
            key
        )))
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), DocumentStoreError> {
        let patch = serde_json::to_string(&fields).map_err(|e| anyhow!(e))?;
        let mut conn = self.conn.clone();
        let script = Script::new(UPDATE_FIELDS);
        let status: i64 = script
            .key(self.key(collection))
            .arg(id)
            .arg(patch)
            .invoke_async(&mut conn)
            .await
            .map_err(store_error)?;

        match status {
            1 => Ok(()),
            0 => Err(DocumentStoreError::NotFound),
            _ => Err(DocumentStoreError::InternalError(anyhow!(
                "unknown script status"
            ))),
        }
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError> {
        self.load(collection)
            .await?
            .into_iter()
            .map(|(id, raw)| Self::decode(id, &raw))
            .collect()
    }
}
