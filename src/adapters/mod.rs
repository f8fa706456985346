// Adapters layer: concrete implementations behind the domain ports.

pub mod api;
pub mod memory;

use crate::config::MigrationConfig;
use crate::domain::ports::Connections;
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub use api::HttpCustomerAccountService;
pub use memory::MemoryDatabase;

/// Builds the shared connection set from configuration. Every sink is
/// constructed once here; a construction failure is fatal before any
/// record work starts.
pub fn connect(config: &MigrationConfig) -> Result<Connections> {
    tracing::debug!(
        import_db = %config.import.database_url,
        etl_db = %config.etl.database_url,
        "using in-process database sinks"
    );
    let accounts = Arc::new(HttpCustomerAccountService::new(
        config.api.uri_prefix.clone(),
    ));
    Ok(Connections {
        import_db: Arc::new(MemoryDatabase::new()),
        etl_db: Arc::new(MemoryDatabase::new()),
        accounts,
        extract_dir: PathBuf::from(&config.extract.file_directory),
    })
}
