use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub hashing: Hashing,
    pub http: Http,
    pub log: Log,
    pub store: Store,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    #[serde(default = "default_diagnostics")]
    pub diagnostics: String, // "quiet" or "verbose"
}

#[derive(Debug, Deserialize)]
pub struct Hashing {
    pub scheme: String, // "bcrypt" or "argon2"
    pub cost: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Http {
    pub address: String,
    pub static_dir: String,
    pub views_dir: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    pub url: Option<String>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub collection: String,
    pub username_field: String,
    pub credential_field: String,
}

// The store url may carry a password.
impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend)
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("prefix", &self.prefix)
            .field("collection", &self.collection)
            .field("username_field", &self.username_field)
            .field("credential_field", &self.credential_field)
            .finish()
    }
}

fn default_diagnostics() -> String {
    "quiet".to_string()
}

fn default_prefix() -> String {
    "docs".to_string()
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "CREDENTIAL_GATE";

/// Loads the TOML file at `path` (or the build's default), then applies
/// `CREDENTIAL_GATE__SECTION__KEY` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
