use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, warn};

use crate::auth::{get_base_url, login};
use crate::session::query_tag_statement;
use crate::{Result, SnowflakeCredentials, SnowflakeSession};

/// Log target shared by the login and query code paths.
pub(crate) const DRIVER_LOG_TARGET: &str = "snowflake_adapter_rs::driver";

/// Establishes sessions from resolved credentials.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    async fn login(&self, credentials: &SnowflakeCredentials) -> Result<SnowflakeSession>;
}

/// The built-in driver, talking to Snowflake's REST login endpoint.
#[derive(Clone)]
pub struct SnowflakeDriver {
    http: Client,
}

impl SnowflakeDriver {
    pub fn new() -> Result<Self> {
        let http = ClientBuilder::new().build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl SessionDriver for SnowflakeDriver {
    async fn login(&self, credentials: &SnowflakeCredentials) -> Result<SnowflakeSession> {
        let auth = credentials.auth_method()?;
        let base_url = get_base_url(credentials)?;
        let session_token = login(&self.http, &base_url, credentials, &auth).await?;

        let session = SnowflakeSession::new(self.http.clone(), base_url, session_token)
            .with_timeout(credentials.connect_timeout().map(Duration::from_secs));
        if let Some(tag) = credentials.query_tag() {
            debug!(target: DRIVER_LOG_TARGET, query_tag = tag, "applying query tag");
            if let Err(err) = session.execute(&query_tag_statement(tag)).await {
                if let Err(logout_err) = session.logout().await {
                    warn!(
                        target: DRIVER_LOG_TARGET,
                        error = %logout_err,
                        "failed to close session after query tag error"
                    );
                }
                return Err(err);
            }
        }
        Ok(session)
    }
}
