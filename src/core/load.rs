use crate::domain::model::{Lane, LoadResult, Record, ID_FIELD};
use crate::domain::ports::{Database, Loader};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One parameterized insert bound to a fixed table and ordered column
/// list. Values are pulled from the record in column order; a column the
/// record does not carry becomes null and the sink decides what to do
/// with it.
pub struct InsertStatement {
    db: Arc<dyn Database>,
    table: String,
    columns: Vec<String>,
}

impl InsertStatement {
    pub fn new(db: Arc<dyn Database>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            db,
            table: table.into(),
            columns,
        }
    }

    fn ordered_values(&self, record: &Record) -> Vec<Value> {
        self.columns
            .iter()
            .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
            .collect()
    }

    pub async fn execute(&self, record: &Record) -> Result<i64> {
        let values = self.ordered_values(record);
        self.db
            .insert_returning_id(&self.table, &self.columns, values)
            .await
    }
}

/// Import-lane loader: one insert per record against the primary sink,
/// reporting the generated identifier.
pub struct ImportLoader {
    statement: InsertStatement,
}

impl ImportLoader {
    pub fn new(statement: InsertStatement) -> Self {
        Self { statement }
    }
}

#[async_trait]
impl Loader for ImportLoader {
    async fn load(&self, record: &Record) -> Result<Record> {
        let id = self.statement.execute(record).await?;
        let mut output = Record::new();
        output.insert(ID_FIELD, Value::from(id));
        Ok(output)
    }
}

/// Runs one lane: every record reaching the lane gets exactly one terminal
/// result, and one record's failure never stops the others.
pub fn spawn_loader(
    mut rx: mpsc::Receiver<Record>,
    loader: Arc<dyn Loader>,
    lane: Lane,
    results: mpsc::Sender<LoadResult>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            let result = match loader.load(&record).await {
                Ok(output) => LoadResult::success(lane, record, output),
                Err(error) => {
                    tracing::debug!(%lane, %error, "record load failed");
                    LoadResult::failure(lane, record, error)
                }
            };
            if results.send(result).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use std::sync::Mutex;

    struct RecordingDatabase {
        inserts: Mutex<Vec<(String, Vec<String>, Vec<Value>)>>,
        fail: bool,
    }

    impl RecordingDatabase {
        fn new() -> Self {
            Self {
                inserts: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                inserts: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Database for RecordingDatabase {
        async fn insert_returning_id(
            &self,
            table: &str,
            columns: &[String],
            values: Vec<Value>,
        ) -> Result<i64> {
            if self.fail {
                return Err(EtlError::Insert {
                    table: table.to_string(),
                    message: "duplicate key".to_string(),
                });
            }
            let mut inserts = self.inserts.lock().unwrap();
            inserts.push((table.to_string(), columns.to_vec(), values));
            Ok(inserts.len() as i64)
        }
    }

    fn record(fields: &[(&str, &str)]) -> Record {
        let mut record = Record::new();
        for (field, value) in fields {
            record.insert(*field, Value::String(value.to_string()));
        }
        record
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_insert_statement_orders_values_by_column_list() {
        let db = Arc::new(RecordingDatabase::new());
        let statement = InsertStatement::new(
            db.clone(),
            "customer_accounts",
            columns(&["member_id", "braintree_token"]),
        );

        let id = statement
            .execute(&record(&[("braintree_token", "abc"), ("member_id", "42")]))
            .await
            .unwrap();

        assert_eq!(id, 1);
        let inserts = db.inserts.lock().unwrap();
        let (table, _, values) = &inserts[0];
        assert_eq!(table, "customer_accounts");
        assert_eq!(
            values,
            &vec![
                Value::String("42".to_string()),
                Value::String("abc".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_insert_statement_fills_missing_columns_with_null() {
        let db = Arc::new(RecordingDatabase::new());
        let statement = InsertStatement::new(
            db.clone(),
            "customer_accounts",
            columns(&["member_id", "braintree_token"]),
        );

        statement
            .execute(&record(&[("member_id", "42")]))
            .await
            .unwrap();

        let inserts = db.inserts.lock().unwrap();
        assert_eq!(inserts[0].2[1], Value::Null);
    }

    #[tokio::test]
    async fn test_import_loader_reports_generated_id() {
        let db = Arc::new(RecordingDatabase::new());
        let loader = ImportLoader::new(InsertStatement::new(
            db,
            "customer_accounts",
            columns(&["member_id"]),
        ));

        let output = loader.load(&record(&[("member_id", "42")])).await.unwrap();
        assert_eq!(output.get(ID_FIELD), Some(&Value::from(1)));
    }

    #[tokio::test]
    async fn test_loader_stage_emits_one_result_per_record() {
        let db = Arc::new(RecordingDatabase::failing());
        let loader: Arc<dyn Loader> = Arc::new(ImportLoader::new(InsertStatement::new(
            db,
            "customer_accounts",
            columns(&["member_id"]),
        )));

        let (tx, rx) = mpsc::channel(1);
        let (results_tx, mut results_rx) = mpsc::channel(1);
        let handle = spawn_loader(rx, loader, Lane::Import, results_tx);

        let collector = tokio::spawn(async move {
            let mut results = Vec::new();
            while let Some(result) = results_rx.recv().await {
                results.push(result);
            }
            results
        });

        tx.send(record(&[("member_id", "42")])).await.unwrap();
        tx.send(record(&[("member_id", "43")])).await.unwrap();
        drop(tx);

        handle.await.unwrap();
        let results = collector.await.unwrap();

        // A failing sink still yields a terminal result per record.
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_success()));
        assert_eq!(results[0].input.text("member_id").unwrap(), "42");
        assert_eq!(results[1].input.text("member_id").unwrap(), "43");
    }
}
