use config::{Config as CConfig, Environment};
use serde::{Deserialize, Serialize};

use crate::core::BenchError::{self, ConfigParsingError};
use crate::workload::WorkloadSpec;

use super::benchmark::BenchmarkConfig;
use super::server::ServerConfig;
use super::stores::{CassandraConfig, MongoConfig, RedisConfig};

pub const ENV_PREFIX: &str = "DBARENA";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mongodb: MongoConfig,
    #[serde(default)]
    pub cassandra: CassandraConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub workload: WorkloadSpec,
}

impl Config {
    pub fn from_str(toml_str: &str) -> Result<Config, BenchError> {
        CConfig::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))
    }

    /// Load from an optional TOML file, overridden by `DBARENA_*` environment
    /// variables (`__` separates nested keys, e.g. `DBARENA_REDIS__URL`).
    pub fn load(path: Option<&str>) -> Result<Config, BenchError> {
        let mut builder = CConfig::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cassandra.hosts"),
            )
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))
    }
}
