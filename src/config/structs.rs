use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub node: NodeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "shortpool=debug".
    pub level: String,
    /// Log file path; empty or unset logs to stdout.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
    /// Probes per key before the engine reports the keyspace exhausted.
    pub probe_budget: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            db_path: "./shortpool_db".to_string(),
            probe_budget: crate::storage::DEFAULT_PROBE_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the store engine this node fronts.
    pub store_url: String,
    /// Keys requested per pool refill.
    pub reserve_batch: usize,
    /// Max entries in each of the positive and negative caches.
    pub cache_capacity: u64,
    /// Lifetime of cached not-found results.
    pub negative_ttl_secs: u64,
    /// Depth of the write-behind propagation queue.
    pub queue_depth: usize,
    /// Concurrent background commits/refills in flight.
    pub max_in_flight: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            store_url: "http://127.0.0.1:8080".to_string(),
            reserve_batch: 128,
            cache_capacity: 10_000,
            negative_ttl_secs: 60,
            queue_depth: 1024,
            max_in_flight: 8,
        }
    }
}
