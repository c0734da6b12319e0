use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::error::AUTH_EXPIRED_MESSAGE;
use crate::{Error, Result, SessionDriver, SnowflakeCredentials, SnowflakeDriver, SnowflakeSession};

/// The runtime a connection attempt is spawned onto.
///
/// Each attempt runs as its own task on this runtime and only sees the
/// credentials it was handed.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    handle: Handle,
}

impl ExecutionContext {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// The runtime the caller is running on, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

pub enum ConnectionState {
    Unopened,
    Open(SnowflakeSession),
    /// Terminal. Holds the error message of the failed attempt.
    Failed(String),
}

impl ConnectionState {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Unopened => "unopened",
            ConnectionState::Open(_) => "open",
            ConnectionState::Failed(_) => "failed",
        }
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Owns a single session attempt for one set of credentials.
pub struct SnowflakeConnectionManager {
    credentials: Arc<SnowflakeCredentials>,
    context: ExecutionContext,
    driver: Arc<dyn SessionDriver>,
    state: ConnectionState,
}

impl SnowflakeConnectionManager {
    /// Creates a manager backed by the built-in [`SnowflakeDriver`].
    pub fn new(credentials: Arc<SnowflakeCredentials>, context: ExecutionContext) -> Result<Self> {
        let driver = SnowflakeDriver::new()?;
        Ok(Self::with_driver(credentials, context, Arc::new(driver)))
    }

    pub fn with_driver(
        credentials: Arc<SnowflakeCredentials>,
        context: ExecutionContext,
        driver: Arc<dyn SessionDriver>,
    ) -> Self {
        Self {
            credentials,
            context,
            driver,
            state: ConnectionState::Unopened,
        }
    }

    pub fn credentials(&self) -> &SnowflakeCredentials {
        &self.credentials
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn session(&self) -> Option<&SnowflakeSession> {
        match &self.state {
            ConnectionState::Open(session) => Some(session),
            _ => None,
        }
    }

    /// Opens the session.
    ///
    /// An expired or rejected token surfaces as [`Error::ConnectionFailed`];
    /// other driver errors are returned as-is. A failed manager stays failed
    /// and is never retried.
    pub async fn open(&mut self) -> Result<&SnowflakeSession> {
        match &self.state {
            ConnectionState::Failed(reason) => {
                return Err(Error::ConnectionFailed(format!(
                    "a previous connection attempt failed: {reason}"
                )));
            }
            ConnectionState::Open(_) => {
                debug!("connection is already open, skipping open");
            }
            ConnectionState::Unopened => {
                debug!(
                    connection = self.credentials.unique_field(),
                    "opening connection"
                );
                match self.attempt().await {
                    Ok(session) => self.state = ConnectionState::Open(session),
                    Err(err) => {
                        self.state = ConnectionState::Failed(err.to_string());
                        return Err(err);
                    }
                }
            }
        }

        self.session()
            .ok_or_else(|| Error::ConnectionFailed("connection is not open".to_string()))
    }

    /// Consumes the manager, dropping any open session, and reports the
    /// state it ended in.
    pub fn close(self) -> &'static str {
        let state = self.state.name();
        debug!(
            connection = self.credentials.unique_field(),
            state, "closing connection"
        );
        state
    }

    async fn attempt(&self) -> Result<SnowflakeSession> {
        let credentials = Arc::clone(&self.credentials);
        let driver = Arc::clone(&self.driver);
        let worker = self
            .context
            .handle
            .spawn(async move { driver.login(&credentials).await });

        match worker.await? {
            Ok(session) => Ok(session),
            Err(err) if err.is_auth_expired() => {
                warn!(
                    connection = self.credentials.unique_field(),
                    error = %err,
                    "authentication expired"
                );
                Err(Error::ConnectionFailed(format!(
                    "{AUTH_EXPIRED_MESSAGE} ({err})"
                )))
            }
            Err(err) => Err(err),
        }
    }
}
