use crate::domain::ports::Database;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process insert sink with per-table monotonically increasing
/// identifiers. Backs local runs and tests; deployments against a real
/// warehouse put their client behind the same [`Database`] port.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: Mutex<HashMap<String, MemoryTable>>,
}

#[derive(Debug, Default)]
struct MemoryTable {
    next_id: i64,
    rows: Vec<MemoryRow>,
}

/// One stored row: the generated identifier plus the inserted values keyed
/// by column name.
#[derive(Debug, Clone)]
pub struct MemoryRow {
    pub id: i64,
    pub values: HashMap<String, Value>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows inserted into `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<MemoryRow> {
        let tables = self.tables.lock().expect("lock poisoned");
        tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.lock().expect("lock poisoned");
        tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn insert_returning_id(
        &self,
        table: &str,
        columns: &[String],
        values: Vec<Value>,
    ) -> Result<i64> {
        if columns.len() != values.len() {
            return Err(EtlError::Insert {
                table: table.to_string(),
                message: format!(
                    "{} columns bound to {} values",
                    columns.len(),
                    values.len()
                ),
            });
        }

        let mut tables = self.tables.lock().expect("lock poisoned");
        let entry = tables.entry(table.to_string()).or_default();
        entry.next_id += 1;
        let id = entry.next_id;
        entry.rows.push(MemoryRow {
            id,
            values: columns.iter().cloned().zip(values).collect(),
        });
        Ok(id)
    }
}
