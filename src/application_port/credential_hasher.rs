use crate::application_port::CredentialError;

/// What a stored credential string looks like, judged from the string alone.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CredentialFormat {
    Hashed,
    LegacyPlaintext,
}

impl CredentialFormat {
    /// A value is hashed when it carries the scheme tag and is at least as long
    /// as the shortest string the scheme serializes to. Anything else is
    /// treated as legacy plaintext.
    pub fn classify(tag: &str, min_len: usize, value: &str) -> Self {
        if value.starts_with(tag) && value.len() >= min_len {
            CredentialFormat::Hashed
        } else {
            CredentialFormat::LegacyPlaintext
        }
    }
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, CredentialError>;
    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialError>;

    fn classify(&self, stored: &str) -> CredentialFormat;
}
