use crate::settings::Settings;
use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

const BOOTSTRAP_FILTER: &str = "info";

pub struct LogConfig {
    pub filter: String,
}

impl From<&Settings> for LogConfig {
    fn from(settings: &Settings) -> Self {
        LogConfig {
            filter: settings.log.filter.clone(),
        }
    }
}

/// Global subscriber whose filter can be swapped once settings are known.
pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
    installed: bool,
}

impl Logger {
    pub fn new_bootstrap() -> Self {
        let filter = EnvFilter::new(BOOTSTRAP_FILTER);
        let (filter, reload_handle) = reload::Layer::new(filter);

        // A subscriber may already be installed (tests, embedding); keep it,
        // but this logger then has nothing to reload.
        let installed = match tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("tracing subscriber already installed: {}", e);
                false
            }
        };

        Self {
            reload_handle,
            installed,
        }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        if !self.installed {
            return Err(anyhow!(
                "log filter not reloadable: another subscriber is installed"
            ));
        }
        let filter = EnvFilter::try_new(&config.filter).map_err(|e| anyhow!(e))?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}
