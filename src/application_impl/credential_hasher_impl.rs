use crate::application_port::{CredentialError, CredentialFormat, CredentialHasher};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use std::sync::Arc;

pub const BCRYPT_TAG: &str = "$2";
pub const BCRYPT_MIN_LEN: usize = 60;
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;
pub const BCRYPT_DEFAULT_COST: u32 = 10;

pub const ARGON2_TAG: &str = "$argon2";
pub const ARGON2_MIN_LEN: usize = 64;
pub const ARGON2_DEFAULT_ITERATIONS: u32 = 2;

/// Runs CPU-bound hashing work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, CredentialError>
where
    F: FnOnce() -> Result<T, CredentialError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CredentialError::InternalError(format!("hashing task failed: {}", e)))?
}

#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&cost) {
            return Err(CredentialError::InternalError(format!(
                "bcrypt cost {} outside {}..={}",
                cost, BCRYPT_MIN_COST, BCRYPT_MAX_COST
            )));
        }
        Ok(Self { cost })
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: BCRYPT_DEFAULT_COST,
        }
    }
}

#[async_trait::async_trait]
impl CredentialHasher for BcryptPasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_owned();
        let cost = self.cost;
        blocking(move || {
            bcrypt::hash(password, cost).map_err(|e| CredentialError::InternalError(e.to_string()))
        })
        .await
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        blocking(move || {
            bcrypt::verify(password, &password_hash)
                .map_err(|e| CredentialError::InternalError(format!("verify error: {}", e)))
        })
        .await
    }

    fn classify(&self, stored: &str) -> CredentialFormat {
        CredentialFormat::classify(BCRYPT_TAG, BCRYPT_MIN_LEN, stored)
    }
}

/// Argon2id with the default memory cost; the work factor is the iteration count.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new(iterations: u32) -> Result<Self, CredentialError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            iterations,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| CredentialError::InternalError(format!("argon2 params: {}", e)))?;
        Ok(Self { params })
    }
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_owned();
        let params = self.params.clone();
        blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            let hash = argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| CredentialError::InternalError(e.to_string()))?
                .to_string();
            Ok(hash)
        })
        .await
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        blocking(move || {
            let parsed = PasswordHash::new(&password_hash).map_err(|e| {
                CredentialError::InternalError(format!("invalid PHC hash: {}", e))
            })?;

            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(_) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(CredentialError::InternalError(format!(
                    "verify error: {}",
                    e
                ))),
            }
        })
        .await
    }

    fn classify(&self, stored: &str) -> CredentialFormat {
        CredentialFormat::classify(ARGON2_TAG, ARGON2_MIN_LEN, stored)
    }
}

/// Builds the hasher for a configured scheme name. `cost` of `None` picks the
/// scheme's default work factor.
pub fn build_hasher(
    scheme: &str,
    cost: Option<u32>,
) -> Result<Arc<dyn CredentialHasher>, CredentialError> {
    match scheme {
        "bcrypt" => Ok(Arc::new(BcryptPasswordHasher::new(
            cost.unwrap_or(BCRYPT_DEFAULT_COST),
        )?)),
        "argon2" => Ok(Arc::new(Argon2PasswordHasher::new(
            cost.unwrap_or(ARGON2_DEFAULT_ITERATIONS),
        )?)),
        other => Err(CredentialError::InternalError(format!(
            "unknown hashing scheme: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bcrypt_round_trip() {
        let hasher = BcryptPasswordHasher::new(BCRYPT_MIN_COST).unwrap();
        let hash = hasher.hash_password("12345").await.unwrap();

        assert!(hash.starts_with("$2b$04$"));
        assert_eq!(hasher.classify(&hash), CredentialFormat::Hashed);
        assert!(hasher.verify_password("12345", &hash).await.unwrap());
        assert!(!hasher.verify_password("54321", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn bcrypt_salts_every_hash() {
        let hasher = BcryptPasswordHasher::new(BCRYPT_MIN_COST).unwrap();
        let a = hasher.hash_password("same").await.unwrap();
        let b = hasher.hash_password("same").await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn bcrypt_default_cost_is_ten() {
        let hasher = BcryptPasswordHasher::default();
        assert_eq!(hasher.cost, 10);
    }

    #[test]
    fn bcrypt_rejects_out_of_range_cost() {
        assert!(BcryptPasswordHasher::new(3).is_err());
        assert!(BcryptPasswordHasher::new(32).is_err());
    }

    #[tokio::test]
    async fn argon2_round_trip() {
        let hasher = Argon2PasswordHasher::new(1).unwrap();
        let hash = hasher.hash_password("12345").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(hasher.classify(&hash), CredentialFormat::Hashed);
        assert!(hasher.verify_password("12345", &hash).await.unwrap());
        assert!(!hasher.verify_password("wrong", &hash).await.unwrap());
    }

    #[test]
    fn classification_follows_configured_scheme() {
        let bcrypt = BcryptPasswordHasher::default();
        let argon2 = Argon2PasswordHasher::new(1).unwrap();
        let bcrypt_hash = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

        assert_eq!(bcrypt.classify(bcrypt_hash), CredentialFormat::Hashed);
        assert_eq!(
            argon2.classify(bcrypt_hash),
            CredentialFormat::LegacyPlaintext
        );
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        assert!(build_hasher("md5", None).is_err());
        assert!(build_hasher("bcrypt", None).is_ok());
        assert!(build_hasher("argon2", Some(3)).is_ok());
    }
}
