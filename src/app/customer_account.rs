use crate::core::load::{ImportLoader, InsertStatement};
use crate::core::partition::by_field_presence;
use crate::core::transform::{correct_timestamps, remove_fields};
use crate::domain::model::{PartitionFn, Record, TransformFn, ID_FIELD};
use crate::domain::ports::{
    Connections, CustomerAccountService, Loader, PostProcess, ProcessDefinition,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const IMPORT_TABLE: &str = "customer_accounts";
const XLAT_TABLE: &str = "member_customer_accounts";
const MARKER_FIELD: &str = "braintree_token";

/// Migration of member records into the customer account system.
///
/// Members already carrying a payment token are imported straight into the
/// account table; the rest get an account created through the finance
/// service. Either way the member's key is linked to the new account id
/// afterwards.
pub struct CustomerAccount;

impl ProcessDefinition for CustomerAccount {
    fn extract_file_name(&self) -> &str {
        "members"
    }

    fn pre_transforms(&self) -> Vec<TransformFn> {
        vec![Box::new(correct_timestamps)]
    }

    fn partition(&self) -> PartitionFn {
        by_field_presence(MARKER_FIELD)
    }

    fn import_transforms(&self) -> Vec<TransformFn> {
        vec![remove_fields(vec![
            "first_name".to_string(),
            "last_name".to_string(),
            "email".to_string(),
            "phone".to_string(),
        ])]
    }

    fn create_transforms(&self) -> Vec<TransformFn> {
        Vec::new()
    }

    fn import_loader(&self, conns: &Connections) -> Arc<dyn Loader> {
        let statement = InsertStatement::new(
            conns.import_db.clone(),
            IMPORT_TABLE,
            vec![
                "member_id".to_string(),
                "braintree_token".to_string(),
                "created_at".to_string(),
                "updated_at".to_string(),
            ],
        );
        Arc::new(ImportLoader::new(statement))
    }

    fn create_loader(&self, conns: &Connections) -> Arc<dyn Loader> {
        Arc::new(CreateCustomerAccount {
            accounts: conns.accounts.clone(),
        })
    }

    fn post_process(&self, conns: &Connections) -> Arc<dyn PostProcess> {
        Arc::new(MemberAccountLink {
            statement: InsertStatement::new(
                conns.etl_db.clone(),
                XLAT_TABLE,
                vec!["member_id".to_string(), "customer_account_id".to_string()],
            ),
        })
    }
}

/// Create-lane loader: extracts the member fields and asks the finance
/// service for a fresh customer account.
struct CreateCustomerAccount {
    accounts: Arc<dyn CustomerAccountService>,
}

#[async_trait]
impl Loader for CreateCustomerAccount {
    async fn load(&self, record: &Record) -> Result<Record> {
        let member_id = record.id("member_id")?;
        let account_id = self
            .accounts
            .create_customer_account(
                member_id,
                record.text("first_name")?,
                record.text("last_name")?,
                record.text("email")?,
                record.text("phone")?,
            )
            .await?;

        let mut output = Record::new();
        output.insert(ID_FIELD, Value::from(account_id));
        Ok(output)
    }
}

/// Joins the member's natural key to its freshly generated account id on
/// the ETL side.
struct MemberAccountLink {
    statement: InsertStatement,
}

#[async_trait]
impl PostProcess for MemberAccountLink {
    async fn apply(&self, input: &Record, output: &Record) -> Result<()> {
        let mut xlat = Record::new();
        xlat.insert(
            "member_id",
            input.get("member_id").cloned().unwrap_or(Value::Null),
        );
        xlat.insert(
            "customer_account_id",
            output.get(ID_FIELD).cloned().unwrap_or(Value::Null),
        );
        self.statement.execute(&xlat).await.map(|_| ())
    }
}
