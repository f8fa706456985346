pub mod cli;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    pub application: ApplicationConfig,
    pub extract: ExtractConfig,
    pub import: ImportConfig,
    pub etl: EtlDatabaseConfig,
    pub api: ApiConfig,
    pub performance: Option<PerformanceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub file_directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlDatabaseConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub uri_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub channel_capacity: Option<usize>,
}

impl MigrationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| EtlError::Config {
            field: "toml".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Stage channel capacity; 1 means fully synchronous hand-off between
    /// stages, which is the default.
    pub fn channel_capacity(&self) -> usize {
        self.performance
            .as_ref()
            .and_then(|p| p.channel_capacity)
            .unwrap_or(1)
    }
}

/// Replaces `${VAR}` markers with the named environment variable, leaving
/// unset markers untouched.
fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

impl Validate for MigrationConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("application.name", &self.application.name)?;
        validation::validate_path("extract.file_directory", &self.extract.file_directory)?;
        validation::validate_non_empty_string("import.database_url", &self.import.database_url)?;
        validation::validate_non_empty_string("etl.database_url", &self.etl.database_url)?;
        validation::validate_url("api.uri_prefix", &self.api.uri_prefix)?;

        if let Some(performance) = &self.performance {
            if let Some(capacity) = performance.channel_capacity {
                validation::validate_positive_number(
                    "performance.channel_capacity",
                    capacity,
                    1,
                )?;
            }
        }
        Ok(())
    }
}
