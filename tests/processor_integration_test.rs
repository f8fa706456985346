use account_migration::adapters::MemoryDatabase;
use account_migration::app::CustomerAccount;
use account_migration::domain::ports::{Connections, CustomerAccountService};
use account_migration::{Processor, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct StubAccountService {
    next_id: AtomicI64,
    calls: Mutex<Vec<(i64, String, String, String, String)>>,
    fail_for_member: Option<i64>,
}

impl StubAccountService {
    fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            calls: Mutex::new(Vec::new()),
            fail_for_member: None,
        }
    }

    fn failing_for(member_id: i64) -> Self {
        Self {
            fail_for_member: Some(member_id),
            ..Self::new()
        }
    }
}

#[async_trait]
impl CustomerAccountService for StubAccountService {
    async fn create_customer_account(
        &self,
        member_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
    ) -> Result<i64> {
        if self.fail_for_member == Some(member_id) {
            return Err(account_migration::EtlError::Remote {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        self.calls.lock().unwrap().push((
            member_id,
            first_name.to_string(),
            last_name.to_string(),
            email.to_string(),
            phone.to_string(),
        ));
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

struct Fixture {
    extract_dir: TempDir,
    import_db: Arc<MemoryDatabase>,
    etl_db: Arc<MemoryDatabase>,
    accounts: Arc<StubAccountService>,
}

impl Fixture {
    fn new(members_csv: &str, accounts: StubAccountService) -> Self {
        let extract_dir = TempDir::new().unwrap();
        fs::write(extract_dir.path().join("members.csv"), members_csv).unwrap();
        Self {
            extract_dir,
            import_db: Arc::new(MemoryDatabase::new()),
            etl_db: Arc::new(MemoryDatabase::new()),
            accounts: Arc::new(accounts),
        }
    }

    fn processor(&self) -> Processor {
        let conns = Connections {
            import_db: self.import_db.clone(),
            etl_db: self.etl_db.clone(),
            accounts: self.accounts.clone(),
            extract_dir: self.extract_dir.path().to_path_buf(),
        };
        Processor::new(Box::new(CustomerAccount), conns, 1)
    }
}

const HEADER: &str = "member_id,braintree_token,first_name,last_name,email,phone,created_at,updated_at";

#[tokio::test]
async fn test_mixed_lanes_end_to_end() {
    // One tokenized member (import lane, created_at backfilled), one
    // without a token (create lane, updated_at backfilled), one with an
    // unparseable id (create lane, per-record failure).
    let csv = format!(
        "{}\n\
         42,abc,A,B,a@b.com,555,,2020-01-01\n\
         43,,C,D,c@d.com,556,2020-02-02,\n\
         not-a-number,,E,F,e@f.com,557,2020-01-01,2020-01-01\n",
        HEADER
    );
    let fixture = Fixture::new(&csv, StubAccountService::new());

    let stats = fixture.processor().run().await.unwrap();

    assert_eq!(stats.extracted, 3);
    assert_eq!(stats.imported, 1);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.extracted, stats.succeeded + stats.failed);

    // Import lane: personal fields stripped, timestamps backfilled.
    let accounts = fixture.import_db.rows("customer_accounts");
    assert_eq!(accounts.len(), 1);
    let row = &accounts[0].values;
    assert_eq!(row["member_id"], Value::String("42".to_string()));
    assert_eq!(row["braintree_token"], Value::String("abc".to_string()));
    assert_eq!(row["created_at"], Value::String("2020-01-01".to_string()));
    assert_eq!(row["updated_at"], Value::String("2020-01-01".to_string()));
    assert!(!row.contains_key("first_name"));

    // Create lane: the service saw the member's fields once.
    let calls = fixture.accounts.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        (
            43,
            "C".to_string(),
            "D".to_string(),
            "c@d.com".to_string(),
            "556".to_string()
        )
    );

    // Post-processing linked both successes, whichever lane they came
    // from; no link is written for the failed record.
    let links = fixture.etl_db.rows("member_customer_accounts");
    assert_eq!(links.len(), 2);
    let mut linked: Vec<(String, i64)> = links
        .iter()
        .map(|row| {
            (
                row.values["member_id"].as_str().unwrap().to_string(),
                row.values["customer_account_id"].as_i64().unwrap(),
            )
        })
        .collect();
    linked.sort();
    assert_eq!(linked, vec![("42".to_string(), 1), ("43".to_string(), 1000)]);
}

#[tokio::test]
async fn test_remote_failure_is_per_record() {
    let csv = format!(
        "{}\n\
         50,,A,B,a@b.com,555,2020-01-01,2020-01-01\n\
         99,,C,D,c@d.com,556,2020-01-01,2020-01-01\n\
         51,,E,F,e@f.com,557,2020-01-01,2020-01-01\n",
        HEADER
    );
    let fixture = Fixture::new(&csv, StubAccountService::failing_for(99));

    let stats = fixture.processor().run().await.unwrap();

    // The failing record does not disturb its neighbours.
    assert_eq!(stats.extracted, 3);
    assert_eq!(stats.created, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(fixture.etl_db.row_count("member_customer_accounts"), 2);
}

#[tokio::test]
async fn test_mid_stream_fault_aborts_after_drain() {
    // The second data row breaks the schema committed by the header.
    let csv = format!(
        "{}\n\
         42,abc,A,B,a@b.com,555,2020-01-01,2020-01-01\n\
         broken-row\n\
         43,def,C,D,c@d.com,556,2020-01-01,2020-01-01\n",
        HEADER
    );
    let fixture = Fixture::new(&csv, StubAccountService::new());

    let outcome = fixture.processor().run().await;

    assert!(outcome.is_err());
    // The record emitted before the fault was still driven to a terminal
    // result and post-processed.
    assert_eq!(fixture.import_db.row_count("customer_accounts"), 1);
    assert_eq!(fixture.etl_db.row_count("member_customer_accounts"), 1);
}

#[tokio::test]
async fn test_missing_extract_file_is_fatal_before_any_work() {
    let fixture = Fixture::new("", StubAccountService::new());
    fs::remove_file(fixture.extract_dir.path().join("members.csv")).unwrap();

    let outcome = fixture.processor().run().await;

    assert!(outcome.is_err());
    assert_eq!(fixture.import_db.row_count("customer_accounts"), 0);
    assert_eq!(fixture.etl_db.row_count("member_customer_accounts"), 0);
}

#[tokio::test]
async fn test_empty_extract_completes_with_zero_counts() {
    let fixture = Fixture::new(&format!("{}\n", HEADER), StubAccountService::new());

    let stats = fixture.processor().run().await.unwrap();

    assert_eq!(stats.extracted, 0);
    assert_eq!(stats.succeeded, 0);
    assert_eq!(stats.failed, 0);
}
