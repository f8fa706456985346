use crate::domain::ports::CustomerAccountService;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Remote finance service client. One POST per created account; the
/// response body is expected to expose the generated identifier.
pub struct HttpCustomerAccountService {
    client: Client,
    uri_prefix: String,
}

impl HttpCustomerAccountService {
    pub fn new(uri_prefix: impl Into<String>) -> Self {
        let mut uri_prefix = uri_prefix.into();
        while uri_prefix.ends_with('/') {
            uri_prefix.pop();
        }
        Self {
            client: Client::new(),
            uri_prefix,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/finance/customer_accounts", self.uri_prefix)
    }
}

#[async_trait]
impl CustomerAccountService for HttpCustomerAccountService {
    async fn create_customer_account(
        &self,
        member_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
    ) -> Result<i64> {
        let body = serde_json::json!({
            "member_id": member_id,
            "first_name": first_name,
            "last_name": last_name,
            "email": email,
            "phone": phone,
        });

        tracing::debug!(member_id, "creating customer account");
        let response = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EtlError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        payload
            .get("id")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| EtlError::Remote {
                status: status.as_u16(),
                message: "response did not contain an id".to_string(),
            })
    }
}
