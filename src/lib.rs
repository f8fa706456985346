pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::CliConfig, MigrationConfig};
pub use core::processor::Processor;
pub use core::stats::StatsSnapshot;
pub use domain::model::{Lane, LoadResult, Record};
pub use domain::ports::Connections;
pub use utils::error::{EtlError, Result};
