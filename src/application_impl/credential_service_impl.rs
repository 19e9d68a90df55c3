use crate::application_port::*;
use crate::domain_model::{UserId, UserRecord, UserSummary};
use crate::domain_port::{Document, DocumentStore, Fields};
use crate::logger::*;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Where user records live in the document store.
#[derive(Debug, Clone)]
pub struct UserCollection {
    pub collection: String,
    pub username_field: String,
    pub credential_field: String,
}

impl Default for UserCollection {
    fn default() -> Self {
        Self {
            collection: "users".to_string(),
            username_field: "username".to_string(),
            credential_field: "password".to_string(),
        }
    }
}

impl UserCollection {
    fn to_record(&self, doc: Document) -> Option<UserRecord> {
        let username = doc.str_field(&self.username_field)?.to_string();
        let credential = doc
            .str_field(&self.credential_field)
            .unwrap_or_default()
            .to_string();
        Some(UserRecord {
            id: UserId(doc.id),
            username,
            credential,
        })
    }

    fn credential_fields(&self, credential: String) -> Fields {
        let mut fields = Fields::new();
        fields.insert(self.credential_field.clone(), Value::String(credential));
        fields
    }
}

pub struct RealCredentialService {
    store: Arc<dyn DocumentStore>,
    credential_hasher: Arc<dyn CredentialHasher>,
    users: UserCollection,
    diagnostics: Diagnostics,
    migrations: TaskTracker,
}

impl RealCredentialService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        credential_hasher: Arc<dyn CredentialHasher>,
        users: UserCollection,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            store,
            credential_hasher,
            users,
            diagnostics,
            migrations: TaskTracker::new(),
        }
    }

    fn require_fields(username: &str, password: &str) -> Result<(), CredentialError> {
        if username.is_empty() || password.is_empty() {
            return Err(CredentialError::MissingFields);
        }
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, CredentialError> {
        let doc = self
            .store
            .find_one(&self.users.collection, &self.users.username_field, username)
            .await?;
        Ok(doc.and_then(|doc| self.users.to_record(doc)))
    }

    fn reject(&self, username: &str, reason: &str) -> CredentialError {
        match self.diagnostics {
            Diagnostics::Verbose => info!(username, reason, "login rejected"),
            Diagnostics::Quiet => info!("login rejected"),
        }
        CredentialError::InvalidCredentials
    }

    /// Rewrites a legacy plaintext credential as a hash in the background.
    /// The login that triggered it has already succeeded; failures are only
    /// reported.
    fn spawn_migration(&self, id: UserId, password: String) {
        let store = self.store.clone();
        let hasher = self.credential_hasher.clone();
        let users = self.users.clone();

        self.migrations.spawn(async move {
            let result: Result<(), CredentialError> = async {
                let hash = hasher.hash_password(&password).await?;
                store
                    .update_fields(&users.collection, &id.0, users.credential_fields(hash))
                    .await?;
                Ok(())
            }
            .await;

            match result {
                Ok(()) => info!(user_id = %id, "legacy credential migrated"),
                Err(e) => warn!(user_id = %id, error = %e, "legacy credential migration failed"),
            }
        });
    }
}

#[async_trait::async_trait]
impl CredentialService for RealCredentialService {
    async fn register(&self, request: RegisterInput) -> Result<UserSummary, CredentialError> {
        let RegisterInput { username, password } = request;

        Self::require_fields(&username, &password)?;

        // Check-then-insert: two concurrent registrations of the same name can
        // both get past this lookup.
        if self.find_by_username(&username).await?.is_some() {
            return Err(CredentialError::Conflict);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;

        let mut fields = self.users.credential_fields(password_hash);
        fields.insert(
            self.users.username_field.clone(),
            Value::String(username.clone()),
        );
        let id = self.store.insert(&self.users.collection, fields).await?;

        debug!(user_id = %id, "user registered");
        Ok(UserSummary {
            id: UserId(id),
            username,
        })
    }

    async fn login(&self, request: LoginInput) -> Result<UserSummary, CredentialError> {
        let LoginInput { username, password } = request;

        Self::require_fields(&username, &password)?;

        let Some(record) = self.find_by_username(&username).await? else {
            return Err(self.reject(&username, "unknown user"));
        };

        let matched = match self.credential_hasher.classify(&record.credential) {
            CredentialFormat::Hashed => {
                self.credential_hasher
                    .verify_password(&password, &record.credential)
                    .await?
            }
            CredentialFormat::LegacyPlaintext => {
                let matched = password == record.credential;
                if matched {
                    self.spawn_migration(record.id.clone(), password);
                }
                matched
            }
        };

        if !matched {
            return Err(self.reject(&username, "password mismatch"));
        }

        Ok(record.summary())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, CredentialError> {
        let docs = self.store.list_all(&self.users.collection).await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| self.users.to_record(doc))
            .map(|record| record.summary())
            .collect())
    }

    async fn set_credential(&self, id: &UserId, password: &str) -> Result<(), CredentialError> {
        if password.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        let password_hash = self.credential_hasher.hash_password(password).await?;
        self.store
            .update_fields(
                &self.users.collection,
                &id.0,
                self.users.credential_fields(password_hash),
            )
            .await?;

        info!(user_id = %id, "credential replaced");
        Ok(())
    }

    async fn settle(&self) {
        self.migrations.close();
        self.migrations.wait().await;
        self.migrations.reopen();
    }
}
