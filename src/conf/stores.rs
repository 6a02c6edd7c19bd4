use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MongoConfig {
    #[serde(default = "MongoConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "MongoConfig::default_uri")]
    pub uri: String,
    #[serde(default = "MongoConfig::default_database")]
    pub database: String,
    #[serde(default = "MongoConfig::default_collection")]
    pub collection: String,
    #[serde(default = "MongoConfig::default_shard_key")]
    pub shard_key: String,
    #[serde(
        with = "humantime_serde",
        default = "MongoConfig::default_server_selection_timeout"
    )]
    pub server_selection_timeout: Duration,
}

impl MongoConfig {
    fn default_enabled() -> bool {
        true
    }
    fn default_uri() -> String {
        String::from("mongodb://localhost:27017")
    }
    fn default_database() -> String {
        String::from("penguins")
    }
    fn default_collection() -> String {
        String::from("penguins")
    }
    fn default_shard_key() -> String {
        String::from("species")
    }
    fn default_server_selection_timeout() -> Duration {
        Duration::from_secs(5)
    }

    /// Fully qualified `database.collection` namespace.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            uri: Self::default_uri(),
            database: Self::default_database(),
            collection: Self::default_collection(),
            shard_key: Self::default_shard_key(),
            server_selection_timeout: Self::default_server_selection_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CassandraConfig {
    #[serde(default = "CassandraConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "CassandraConfig::default_hosts")]
    pub hosts: Vec<String>,
    #[serde(default = "CassandraConfig::default_keyspace")]
    pub keyspace: String,
    #[serde(default = "CassandraConfig::default_table")]
    pub table: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(
        with = "humantime_serde",
        default = "CassandraConfig::default_connect_timeout"
    )]
    pub connect_timeout: Duration,
}

impl CassandraConfig {
    fn default_enabled() -> bool {
        true
    }
    fn default_hosts() -> Vec<String> {
        vec![String::from("localhost:9042")]
    }
    fn default_keyspace() -> String {
        String::from("penguins")
    }
    fn default_table() -> String {
        String::from("penguins")
    }
    fn default_connect_timeout() -> Duration {
        Duration::from_secs(10)
    }
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            hosts: Self::default_hosts(),
            keyspace: Self::default_keyspace(),
            table: Self::default_table(),
            username: None,
            password: None,
            connect_timeout: Self::default_connect_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    #[serde(default = "RedisConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "RedisConfig::default_url")]
    pub url: String,
    /// Records live in hashes named `<key_prefix>:<sample number>`.
    #[serde(default = "RedisConfig::default_key_prefix")]
    pub key_prefix: String,
}

impl RedisConfig {
    fn default_enabled() -> bool {
        true
    }
    fn default_url() -> String {
        String::from("redis://localhost:6379")
    }
    fn default_key_prefix() -> String {
        String::from("penguin")
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            url: Self::default_url(),
            key_prefix: Self::default_key_prefix(),
        }
    }
}
