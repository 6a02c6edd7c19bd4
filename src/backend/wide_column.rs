//! Wide-column store adapter (Cassandra, via the CQL driver).
//!
//! The provisioned table is partitioned by species and clustered by sample
//! number, so every keyed statement addresses `(species, sample_number)`.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use scylla::prepared_statement::PreparedStatement;
use scylla::{Session, SessionBuilder};
use tokio::time::Instant;

use crate::conf::CassandraConfig;
use crate::core::BenchError;
use crate::workload::{Operation, Species};

use super::{BackendHandle, BackendId, BackendKind, BenchBackend};

pub struct CassandraBackend {
    config: CassandraConfig,
}

impl CassandraBackend {
    pub fn new(config: CassandraConfig) -> Self {
        Self { config }
    }

    async fn open_session(&self) -> Result<Session, String> {
        let mut builder = SessionBuilder::new()
            .known_nodes(&self.config.hosts)
            .connection_timeout(self.config.connect_timeout);
        if let (Some(user), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.user(user, password);
        }
        let session = builder.build().await.map_err(|e| e.to_string())?;
        session
            .use_keyspace(&self.config.keyspace, false)
            .await
            .map_err(|e| e.to_string())?;
        Ok(session)
    }
}

struct Statements {
    insert: PreparedStatement,
    select_one: PreparedStatement,
    select_species: PreparedStatement,
    select_species_mass: PreparedStatement,
    update: PreparedStatement,
    delete: PreparedStatement,
    scan: PreparedStatement,
}

impl Statements {
    async fn prepare(session: &Session, table: &str) -> Result<Self, String> {
        let prepare =
            |cql: String| async move { session.prepare(cql).await.map_err(|e| e.to_string()) };
        Ok(Self {
            insert: prepare(format!(
                "INSERT INTO {table} (study_name, sample_number, species, island, \
                 culmen_length_mm, culmen_depth_mm, flipper_length_mm, body_mass_g, sex) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ))
            .await?,
            select_one: prepare(format!(
                "SELECT * FROM {table} WHERE species = ? AND sample_number = ?"
            ))
            .await?,
            select_species: prepare(format!("SELECT * FROM {table} WHERE species = ?")).await?,
            select_species_mass: prepare(format!(
                "SELECT * FROM {table} WHERE species = ? AND body_mass_g >= ? \
                 AND body_mass_g <= ? ALLOW FILTERING"
            ))
            .await?,
            update: prepare(format!(
                "UPDATE {table} SET flipper_length_mm = ?, body_mass_g = ? \
                 WHERE species = ? AND sample_number = ?"
            ))
            .await?,
            delete: prepare(format!(
                "DELETE FROM {table} WHERE species = ? AND sample_number = ?"
            ))
            .await?,
            scan: prepare(format!("SELECT * FROM {table}")).await?,
        })
    }
}

#[async_trait]
impl BenchBackend for CassandraBackend {
    fn id(&self) -> BackendId {
        BackendKind::Cassandra.id()
    }

    async fn connect(&self) -> Result<Box<dyn BackendHandle>, BenchError> {
        let id = self.id();
        let session = self
            .open_session()
            .await
            .map_err(|e| BenchError::connection(id.as_str(), e))?;
        let statements = Statements::prepare(&session, &self.config.table)
            .await
            .map_err(|e| BenchError::connection(id.as_str(), e))?;
        info!(
            "Connected to Cassandra at {} (keyspace {})",
            self.config.hosts.join(","),
            self.config.keyspace
        );
        Ok(Box::new(CassandraHandle {
            session: Some(session),
            statements,
        }))
    }
}

struct CassandraHandle {
    session: Option<Session>,
    statements: Statements,
}

fn int(v: u32) -> Result<i32, BenchError> {
    i32::try_from(v).map_err(|_| BenchError::OperationError(format!("{v} exceeds CQL int")))
}

fn partition(key: u32) -> Result<(&'static str, i32), BenchError> {
    Ok((Species::for_key(key).as_str(), int(key)?))
}

#[async_trait]
impl BackendHandle for CassandraHandle {
    async fn execute(&mut self, op: &Operation) -> Result<Duration, BenchError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| BenchError::operation("session already closed"))?;
        let st = &self.statements;

        let elapsed = match op {
            Operation::Insert(p) => {
                let values = (
                    p.study_name.as_str(),
                    int(p.sample_number)?,
                    p.species.as_str(),
                    p.island.as_str(),
                    p.culmen_length_mm,
                    p.culmen_depth_mm,
                    int(p.flipper_length_mm)?,
                    int(p.body_mass_g)?,
                    p.sex.as_str(),
                );
                let start = Instant::now();
                session
                    .execute_unpaged(&st.insert, values)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::PointQuery(key) => {
                let values = partition(*key)?;
                let start = Instant::now();
                session
                    .execute_unpaged(&st.select_one, values)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::FilterQuery(predicate) => {
                let species = predicate.species.as_str();
                let start;
                match predicate.body_mass_g {
                    Some((min, max)) => {
                        let values = (species, int(min)?, int(max)?);
                        start = Instant::now();
                        session
                            .execute_unpaged(&st.select_species_mass, values)
                            .await
                            .map_err(BenchError::operation)?;
                    }
                    None => {
                        start = Instant::now();
                        session
                            .execute_unpaged(&st.select_species, (species,))
                            .await
                            .map_err(BenchError::operation)?;
                    }
                }
                start.elapsed()
            }
            Operation::Update(key, patch) => {
                let (species, sample_number) = partition(*key)?;
                let values = (
                    int(patch.flipper_length_mm)?,
                    int(patch.body_mass_g)?,
                    species,
                    sample_number,
                );
                let start = Instant::now();
                session
                    .execute_unpaged(&st.update, values)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::Delete(key) => {
                let values = partition(*key)?;
                let start = Instant::now();
                session
                    .execute_unpaged(&st.delete, values)
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
            Operation::Scan => {
                let start = Instant::now();
                session
                    .execute_unpaged(&st.scan, ())
                    .await
                    .map_err(BenchError::operation)?;
                start.elapsed()
            }
        };
        Ok(elapsed)
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        // The driver tears down its connection pool on drop.
        self.session.take();
        Ok(())
    }
}
