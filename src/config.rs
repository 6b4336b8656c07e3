use anyhow::{bail, Result};
use despacho_engine::QueueSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub queue: QueueSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
    pub event_bus_capacity: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/despacho.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            event_bus_capacity: 256,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            api: ApiConfig::default(),
            queue: QueueSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads the TOML file (when present) layered under `DESPACHO_`
    /// environment overrides, e.g. `DESPACHO_DATABASE__URL`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("DESPACHO").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            bail!("database.url must not be empty");
        }
        if !self.database.url.starts_with("sqlite:") {
            bail!("database.url must be a sqlite:// URL");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        if self.api.bind_address.parse::<std::net::SocketAddr>().is_err() {
            bail!("api.bind_address must be a host:port pair");
        }
        if self.queue.overdue_minutes <= 0 {
            bail!("queue.overdue_minutes must be positive");
        }
        if self.queue.neighbor_span == 0 {
            bail!("queue.neighbor_span must be at least 1");
        }
        Ok(())
    }
}
