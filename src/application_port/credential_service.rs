use crate::domain_model::{UserId, UserSummary};
use crate::domain_port::DocumentStoreError;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("missing fields")]
    MissingFields,
    #[error("username already taken")]
    Conflict,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<DocumentStoreError> for CredentialError {
    fn from(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::Unavailable(e) => CredentialError::StoreUnavailable(e),
            DocumentStoreError::NotFound => CredentialError::NotFound,
            DocumentStoreError::Malformed(e) => CredentialError::InternalError(e),
            DocumentStoreError::InternalError(e) => CredentialError::InternalError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// How much a rejected login tells the logs. Responses never differ.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Diagnostics {
    #[default]
    Quiet,
    Verbose,
}

impl std::str::FromStr for Diagnostics {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiet" => Ok(Diagnostics::Quiet),
            "verbose" => Ok(Diagnostics::Verbose),
            other => Err(format!("unknown diagnostics level: {}", other)),
        }
    }
}

#[async_trait::async_trait]
pub trait CredentialService: Send + Sync {
    async fn register(&self, request: RegisterInput) -> Result<UserSummary, CredentialError>;
    async fn login(&self, request: LoginInput) -> Result<UserSummary, CredentialError>;

    async fn list_users(&self) -> Result<Vec<UserSummary>, CredentialError>;
    async fn set_credential(&self, id: &UserId, password: &str) -> Result<(), CredentialError>;

    /// Waits for every credential migration started so far.
    async fn settle(&self);
}
