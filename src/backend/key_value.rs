//! Key-value store adapter (Redis).
//!
//! Each record is a hash `<prefix>:<sample number>` whose fields hold
//! JSON-encoded values. `species:<name>` and `island:<name>` sets index the
//! sample numbers for filtered reads.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use redis::aio::MultiplexedConnection;
use tokio::time::Instant;

use crate::conf::RedisConfig;
use crate::core::BenchError;
use crate::workload::{Island, Operation, Penguin, Species};

use super::{BackendHandle, BackendId, BackendKind, BenchBackend};

const SCAN_BATCH: usize = 500;

pub struct RedisBackend {
    config: RedisConfig,
}

impl RedisBackend {
    pub fn new(config: RedisConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BenchBackend for RedisBackend {
    fn id(&self) -> BackendId {
        BackendKind::Redis.id()
    }

    async fn connect(&self) -> Result<Box<dyn BackendHandle>, BenchError> {
        let id = self.id();
        let client = redis::Client::open(self.config.url.as_str())
            .map_err(|e| BenchError::connection(id.as_str(), e))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BenchError::connection(id.as_str(), e))?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| BenchError::connection(id.as_str(), e))?;
        info!("Connected to Redis at {}", self.config.url);
        Ok(Box::new(RedisHandle {
            conn: Some(conn),
            prefix: self.config.key_prefix.clone(),
        }))
    }
}

struct RedisHandle {
    conn: Option<MultiplexedConnection>,
    prefix: String,
}

fn species_set(species: Species) -> String {
    format!("species:{}", species.as_str())
}

fn island_set(island: Island) -> String {
    format!("island:{}", island.as_str())
}

/// Hash fields for a record, each value JSON-encoded.
fn hash_fields(penguin: &Penguin) -> Result<Vec<(String, String)>, BenchError> {
    let value = serde_json::to_value(penguin).map_err(BenchError::operation)?;
    let serde_json::Value::Object(map) = value else {
        return Err(BenchError::operation("record did not serialize to an object"));
    };
    Ok(map.into_iter().map(|(k, v)| (k, v.to_string())).collect())
}

fn body_mass(fields: &HashMap<String, String>) -> Option<u32> {
    fields.get("bodyMass").and_then(|v| v.parse().ok())
}

impl RedisHandle {
    fn key(&self, sample_number: u32) -> String {
        format!("{}:{}", self.prefix, sample_number)
    }

    /// Fetch every hash in `keys` with one pipelined round trip.
    async fn fetch_all(
        conn: &mut MultiplexedConnection,
        keys: &[String],
    ) -> redis::RedisResult<Vec<HashMap<String, String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.hgetall(key);
        }
        pipe.query_async(conn).await
    }

    async fn scan_keys(
        conn: &mut MultiplexedConnection,
        pattern: &str,
    ) -> redis::RedisResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }
}

#[async_trait]
impl BackendHandle for RedisHandle {
    async fn execute(&mut self, op: &Operation) -> Result<Duration, BenchError> {
        let mut conn = self
            .conn
            .clone()
            .ok_or_else(|| BenchError::operation("connection already closed"))?;

        let elapsed = match op {
            Operation::Insert(penguin) => {
                let key = self.key(penguin.sample_number);
                let fields = hash_fields(penguin)?;
                let mut pipe = redis::pipe();
                pipe.hset_multiple(&key, &fields)
                    .ignore()
                    .sadd(species_set(penguin.species), penguin.sample_number)
                    .ignore()
                    .sadd(island_set(penguin.island), penguin.sample_number)
                    .ignore();
                let start = Instant::now();
                let _: () = pipe
                    .query_async(&mut conn)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::PointQuery(key) => {
                let key = self.key(*key);
                let start = Instant::now();
                let _: HashMap<String, String> = redis::cmd("HGETALL")
                    .arg(&key)
                    .query_async(&mut conn)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::FilterQuery(predicate) => {
                let set = species_set(predicate.species);
                let start = Instant::now();
                let members: Vec<u32> = redis::cmd("SMEMBERS")
                    .arg(&set)
                    .query_async(&mut conn)
                    .await
                    .map_err(BenchError::operation)?;
                let keys: Vec<String> = members.iter().map(|n| self.key(*n)).collect();
                let rows = Self::fetch_all(&mut conn, &keys)
                    .await
                    .map_err(BenchError::operation)?;
                let elapsed = start.elapsed();
                // Redis has no secondary range index; the range applies client-side.
                if let Some((min, max)) = predicate.body_mass_g {
                    let matched = rows
                        .iter()
                        .filter(|r| body_mass(r).is_some_and(|m| (min..=max).contains(&m)))
                        .count();
                    debug!("redis filter on {} matched {matched}", set);
                }
                elapsed
            }
            Operation::Update(key, patch) => {
                let key = self.key(*key);
                let mut pipe = redis::pipe();
                pipe.hset(&key, "flipperLength", patch.flipper_length_mm)
                    .ignore()
                    .hset(&key, "bodyMass", patch.body_mass_g)
                    .ignore();
                let start = Instant::now();
                let _: () = pipe
                    .query_async(&mut conn)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::Delete(sample_number) => {
                let key = self.key(*sample_number);
                let mut pipe = redis::pipe();
                pipe.del(&key)
                    .ignore()
                    .srem(species_set(Species::for_key(*sample_number)), *sample_number)
                    .ignore();
                for island in Island::ALL {
                    pipe.srem(island_set(island), *sample_number).ignore();
                }
                let start = Instant::now();
                let _: () = pipe
                    .query_async(&mut conn)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::Scan => {
                let pattern = format!("{}:*", self.prefix);
                let start = Instant::now();
                let keys = Self::scan_keys(&mut conn, &pattern)
                    .await
                    .map_err(BenchError::operation)?;
                Self::fetch_all(&mut conn, &keys)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
        };
        Ok(elapsed)
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        self.conn = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::Sex;

    #[test]
    fn test_hash_fields_are_json_encoded() {
        let penguin = Penguin {
            sample_number: 12,
            study_name: "PAL0809".to_string(),
            species: Species::Chinstrap,
            island: Island::Dream,
            culmen_length_mm: 46.5,
            culmen_depth_mm: 17.9,
            flipper_length_mm: 192,
            body_mass_g: 3500,
            sex: Sex::Female,
        };
        let fields: HashMap<String, String> = hash_fields(&penguin).unwrap().into_iter().collect();
        assert_eq!(fields["species"], "\"Chinstrap\"");
        assert_eq!(fields["sampleNumber"], "12");
        assert_eq!(fields["culmenLength"], "46.5");
        assert_eq!(body_mass(&fields), Some(3500));
    }

    #[test]
    fn test_index_set_names() {
        assert_eq!(species_set(Species::Gentoo), "species:Gentoo");
        assert_eq!(island_set(Island::Torgersen), "island:Torgersen");
    }
}
