use crate::domain::model::{PartitionFn, Record, TransformFn};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Insert-and-return-identifier sink contract. The sink is responsible for
/// its own concurrency control; the pipeline never serializes access to it.
#[async_trait]
pub trait Database: Send + Sync {
    async fn insert_returning_id(
        &self,
        table: &str,
        columns: &[String],
        values: Vec<Value>,
    ) -> Result<i64>;
}

/// Remote finance service contract: one call with a fixed positional
/// argument set, returning the generated account identifier.
#[async_trait]
pub trait CustomerAccountService: Send + Sync {
    async fn create_customer_account(
        &self,
        member_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
    ) -> Result<i64>;
}

/// Lane loader contract. `Ok` carries the output record with the generated
/// identifier under [`ID_FIELD`](crate::domain::model::ID_FIELD); `Err` is
/// a per-record failure that must not affect any other record.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, record: &Record) -> Result<Record>;
}

/// Secondary write performed once for every successful load, joining a key
/// from the input record with a key from the loader output.
#[async_trait]
pub trait PostProcess: Send + Sync {
    async fn apply(&self, input: &Record, output: &Record) -> Result<()>;
}

/// Shared connection set, constructed once at startup and passed by
/// reference into every component that needs it.
pub struct Connections {
    pub import_db: Arc<dyn Database>,
    pub etl_db: Arc<dyn Database>,
    pub accounts: Arc<dyn CustomerAccountService>,
    pub extract_dir: PathBuf,
}

impl Connections {
    pub fn extract_path(&self, name: &str) -> PathBuf {
        self.extract_dir.join(format!("{}.csv", name))
    }
}

/// Capability set one migration process exposes to the orchestrator: where
/// to extract from, how to transform, how to split the stream, how each
/// lane loads, and what to write after a successful load.
pub trait ProcessDefinition: Send + Sync {
    fn extract_file_name(&self) -> &str;
    fn pre_transforms(&self) -> Vec<TransformFn>;
    fn partition(&self) -> PartitionFn;
    fn import_transforms(&self) -> Vec<TransformFn>;
    fn create_transforms(&self) -> Vec<TransformFn>;
    fn import_loader(&self, conns: &Connections) -> Arc<dyn Loader>;
    fn create_loader(&self, conns: &Connections) -> Arc<dyn Loader>;
    fn post_process(&self, conns: &Connections) -> Arc<dyn PostProcess>;
}
