//! Configuration loading: optional TOML file plus `SHORTPOOL_*` environment
//! overrides (e.g. `SHORTPOOL_SERVER__PORT=9000`), deserialized onto
//! serde-defaulted structs so an empty environment still yields a runnable
//! config.

mod structs;

use std::path::Path;

use crate::errors::{Result, ShortpoolError};
pub use structs::{AppConfig, LoggingConfig, NodeConfig, ServerConfig, StoreConfig};

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(p) => builder.add_source(config::File::from(p)),
            None => builder.add_source(config::File::with_name("shortpool").required(false)),
        };
        builder = builder.add_source(
            config::Environment::with_prefix("SHORTPOOL")
                .separator("__")
                .try_parsing(true),
        );
        builder
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| ShortpoolError::invalid_argument(format!("invalid configuration: {}", e)))
    }
}
