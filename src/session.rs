use std::time::Duration;

use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::debug;

use crate::driver::DRIVER_LOG_TARGET;
use crate::{Error, Result, types::SnowflakeResponse};

const SESSION_EXPIRED: &str = "390112";
const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// An authenticated Snowflake session.
pub struct SnowflakeSession {
    http: reqwest::Client,
    base_url: Url,
    session_token: String,
    timeout: Option<Duration>,
}

impl SnowflakeSession {
    pub fn new(http: reqwest::Client, base_url: Url, session_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            session_token: session_token.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(self, timeout: Option<Duration>) -> Self {
        Self { timeout, ..self }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Runs a single statement and returns its raw result set.
    pub async fn execute(&self, sql: &str) -> Result<QueryResult> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut url = self.base_url.join("queries/v1/query-request")?;
        url.query_pairs_mut().append_pair("requestId", &request_id);
        debug!(target: DRIVER_LOG_TARGET, %request_id, "executing statement");

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/snowflake")
            .header(AUTHORIZATION, self.authorization())
            .timeout(self.timeout())
            .json(&QueryRequest { sql_text: sql })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Communication(body));
        }

        let response: SnowflakeResponse<QueryResult> =
            serde_json::from_str(&body).map_err(|e| Error::Json(e, body))?;
        if let Some(SESSION_EXPIRED) = response.code.as_deref() {
            return Err(Error::SessionExpired);
        }
        if !response.success {
            return Err(Error::Communication(response.message.unwrap_or_default()));
        }

        response
            .data
            .ok_or_else(|| Error::Communication("missing query-response data".to_string()))
    }

    /// Deletes the session on the server side.
    pub async fn logout(&self) -> Result<()> {
        let mut url = self.base_url.join("session")?;
        url.query_pairs_mut().append_pair("delete", "true");
        debug!(target: DRIVER_LOG_TARGET, "closing session");

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/snowflake")
            .header(AUTHORIZATION, self.authorization())
            .timeout(self.timeout())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Communication(response.text().await?));
        }
        Ok(())
    }

    fn authorization(&self) -> String {
        format!(r#"Snowflake Token="{}""#, self.session_token)
    }

    fn timeout(&self) -> Duration {
        self.timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }
}

/// Tags every query of the session, so they can be found in query history.
pub(crate) fn query_tag_statement(tag: &str) -> String {
    format!("ALTER SESSION SET QUERY_TAG = '{}'", tag.replace('\'', "''"))
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    sql_text: &'a str,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query_id: String,

    #[serde(rename = "rowset", default)]
    pub row_set: Vec<Vec<Option<String>>>,
}
