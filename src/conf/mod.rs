mod benchmark;
mod config;
mod server;
mod stores;

pub use benchmark::BenchmarkConfig;
pub use config::{Config, ENV_PREFIX};
pub use server::ServerConfig;
pub use stores::{CassandraConfig, MongoConfig, RedisConfig};
