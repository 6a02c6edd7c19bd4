//! Document store adapter (MongoDB).
//!
//! Records are stored one document per observation in the provisioned
//! collection, keyed by `sampleNumber`. The collection validates integer
//! fields as int32, so documents are built by hand rather than through serde.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Cursor};
use tokio::time::Instant;

use crate::conf::MongoConfig;
use crate::core::BenchError;
use crate::workload::{Operation, Penguin, PenguinPatch, Predicate};

use super::{BackendHandle, BackendId, BackendKind, BenchBackend};

pub struct MongoBackend {
    config: MongoConfig,
}

impl MongoBackend {
    pub fn new(config: MongoConfig) -> Self {
        Self { config }
    }
}

/// Open a client and verify the deployment answers `ping`.
pub(crate) async fn open_client(config: &MongoConfig) -> Result<Client, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&config.uri).await?;
    options.server_selection_timeout = Some(config.server_selection_timeout);
    options.app_name = Some("dbarena".to_string());
    let client = Client::with_options(options)?;
    client.database("admin").run_command(doc! { "ping": 1 }).await?;
    Ok(client)
}

#[async_trait]
impl BenchBackend for MongoBackend {
    fn id(&self) -> BackendId {
        BackendKind::MongoDb.id()
    }

    async fn connect(&self) -> Result<Box<dyn BackendHandle>, BenchError> {
        let client = open_client(&self.config)
            .await
            .map_err(|e| BenchError::connection(self.id().as_str(), e))?;
        let collection = client
            .database(&self.config.database)
            .collection::<Document>(&self.config.collection);
        info!("Connected to MongoDB at {}", self.config.uri);
        Ok(Box::new(MongoHandle {
            client: Some(client),
            collection,
        }))
    }
}

struct MongoHandle {
    client: Option<Client>,
    collection: Collection<Document>,
}

fn int32(v: u32) -> Result<i32, BenchError> {
    i32::try_from(v).map_err(|_| BenchError::OperationError(format!("{v} exceeds int32")))
}

fn key_filter(key: u32) -> Result<Document, BenchError> {
    Ok(doc! { "sampleNumber": int32(key)? })
}

fn penguin_document(p: &Penguin) -> Result<Document, BenchError> {
    Ok(doc! {
        "studyName": p.study_name.as_str(),
        "sampleNumber": int32(p.sample_number)?,
        "species": p.species.as_str(),
        "island": p.island.as_str(),
        "culmenLength": p.culmen_length_mm,
        "culmenDepth": p.culmen_depth_mm,
        "flipperLength": int32(p.flipper_length_mm)?,
        "bodyMass": int32(p.body_mass_g)?,
        "sex": p.sex.as_str(),
    })
}

fn patch_update(patch: &PenguinPatch) -> Result<Document, BenchError> {
    Ok(doc! {
        "$set": {
            "flipperLength": int32(patch.flipper_length_mm)?,
            "bodyMass": int32(patch.body_mass_g)?,
        }
    })
}

fn predicate_filter(predicate: &Predicate) -> Document {
    let mut filter = doc! { "species": predicate.species.as_str() };
    if let Some((min, max)) = predicate.body_mass_g {
        filter.insert(
            "bodyMass",
            doc! { "$gte": i64::from(min), "$lte": i64::from(max) },
        );
    }
    filter
}

async fn drain(mut cursor: Cursor<Document>) -> Result<usize, mongodb::error::Error> {
    let mut n = 0;
    while cursor.advance().await? {
        n += 1;
    }
    Ok(n)
}

#[async_trait]
impl BackendHandle for MongoHandle {
    async fn execute(&mut self, op: &Operation) -> Result<Duration, BenchError> {
        let coll = &self.collection;
        let elapsed = match op {
            Operation::Insert(penguin) => {
                // Reruns overwrite the record instead of adding a duplicate.
                let filter = key_filter(penguin.sample_number)?;
                let document = penguin_document(penguin)?;
                let start = Instant::now();
                coll.replace_one(filter, document)
                    .upsert(true)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::PointQuery(key) => {
                let filter = key_filter(*key)?;
                let start = Instant::now();
                coll.find_one(filter).await.map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::FilterQuery(predicate) => {
                let filter = predicate_filter(predicate);
                let start = Instant::now();
                let cursor = coll.find(filter).await.map_err(BenchError::operation)?;
                let rows = drain(cursor).await.map_err(BenchError::operation)?;
                let elapsed = start.elapsed();
                debug!("mongodb filter on {} matched {rows}", predicate.species.as_str());
                elapsed
            }
            Operation::Update(key, patch) => {
                let filter = key_filter(*key)?;
                let update = patch_update(patch)?;
                let start = Instant::now();
                coll.update_one(filter, update)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::Delete(key) => {
                let filter = key_filter(*key)?;
                let start = Instant::now();
                coll.delete_one(filter).await.map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::Scan => {
                let start = Instant::now();
                let cursor = coll.find(doc! {}).await.map_err(BenchError::operation)?;
                drain(cursor).await.map_err(BenchError::operation)?;
                start.elapsed()
            }
        };
        Ok(elapsed)
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
        }
        Ok(())
    }
}
