use async_trait::async_trait;
use log::warn;
use mongodb::bson::{Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Client, IndexModel};
use tokio::sync::OnceCell;

use crate::backend::document::open_client;
use crate::conf::MongoConfig;
use crate::core::BenchError;

use super::{ShardedCluster, ShardingOutcome, ShardingStatus};

/// Sharding control for a MongoDB cluster reached through a `mongos` router.
pub struct MongoCluster {
    config: MongoConfig,
    client: OnceCell<Client>,
}

fn topology_err(err: impl ToString) -> BenchError {
    BenchError::TopologyError(err.to_string())
}

fn ascending(key: &str) -> Document {
    let mut keys = Document::new();
    keys.insert(key, 1);
    keys
}

fn already_sharded(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(cmd) => cmd.message.contains("already sharded"),
        _ => false,
    }
}

impl MongoCluster {
    pub fn new(config: MongoConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client, BenchError> {
        self.client
            .get_or_try_init(|| open_client(&self.config))
            .await
            .map_err(topology_err)
    }
}

#[async_trait]
impl ShardedCluster for MongoCluster {
    async fn status(&self) -> Result<ShardingStatus, BenchError> {
        let client = self.client().await?;
        let entry = client
            .database("config")
            .collection::<Document>("collections")
            .find_one(doc! { "_id": self.config.namespace() })
            .await
            .map_err(topology_err)?;
        let document_count = client
            .database(&self.config.database)
            .collection::<Document>(&self.config.collection)
            .estimated_document_count()
            .await
            .map_err(topology_err)?;

        // Dropped collections keep their config entry, flagged as such.
        let entry = entry.filter(|e| !e.get_bool("dropped").unwrap_or(false));
        Ok(match entry {
            Some(entry) => ShardingStatus {
                is_sharded: true,
                shard_key: entry
                    .get_document("key")
                    .map(|key| key.keys().cloned().collect())
                    .unwrap_or_default(),
                document_count,
            },
            None => ShardingStatus {
                is_sharded: false,
                shard_key: Vec::new(),
                document_count,
            },
        })
    }

    async fn shard(&self, key: &str) -> Result<ShardingOutcome, BenchError> {
        let client = self.client().await?;
        let admin = client.database("admin");

        admin
            .run_command(doc! { "enableSharding": self.config.database.as_str() })
            .await
            .map_err(topology_err)?;

        client
            .database(&self.config.database)
            .collection::<Document>(&self.config.collection)
            .create_index(IndexModel::builder().keys(ascending(key)).build())
            .await
            .map_err(topology_err)?;

        let result = admin
            .run_command(doc! {
                "shardCollection": self.config.namespace(),
                "key": ascending(key),
            })
            .await;
        match result {
            Ok(_) => Ok(ShardingOutcome::Enabled),
            Err(e) if already_sharded(&e) => {
                warn!("Collection already sharded: {e}");
                Ok(ShardingOutcome::AlreadySharded)
            }
            Err(e) => Err(topology_err(e)),
        }
    }
}
