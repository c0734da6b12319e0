//! # Snowflake Adapter
//!
//! Resolves Snowflake connection credentials from a profile and opens
//! sessions with them.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use snowflake_adapter_rs::{
//! #     Environment, ExecutionContext, ProfileFields, Result, SnowflakeConnectionManager,
//! #     SnowflakeCredentials,
//! # };
//! # async fn run() -> Result<()> {
//! let fields = ProfileFields::from_yaml_str(
//!     r#"
//! account: my_account
//! user: USERNAME
//! password: PASSWORD
//! database: DATABASE
//! warehouse: WAREHOUSE
//! schema: SCHEMA
//! "#,
//! )?;
//! let credentials = SnowflakeCredentials::resolve(fields, &Environment::from_process())?;
//! assert_eq!(credentials.account(), Some("my-account"));
//!
//! let context = ExecutionContext::current().expect("inside a tokio runtime");
//! let mut connection = SnowflakeConnectionManager::new(Arc::new(credentials), context)?;
//! let session = connection.open().await?;
//! session.execute("SELECT 1").await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod authenticator;
mod connection;
mod credentials;
mod driver;
mod environment;
mod error;
pub mod logging;
mod profile;
mod session;
mod types;

pub use authenticator::Authenticator;
pub use connection::{ConnectionState, ExecutionContext, SnowflakeConnectionManager};
pub use credentials::SnowflakeCredentials;
pub use driver::{SessionDriver, SnowflakeDriver};
pub use environment::{DEBUG_LOGGING, Environment, SNOWFLAKE_ACCOUNT, SNOWFLAKE_USER};
pub use error::{Error, Result};
pub use logging::{AdapterLogger, TracingAdapterLogger, init_connector_logging};
pub use profile::ProfileFields;
pub use session::{QueryResult, SnowflakeSession};

/// How a driver proves the identity in [`SnowflakeCredentials`].
#[derive(Clone)]
pub enum SnowflakeAuthMethod {
    Password(String),
    /// Password followed by a push to the user's MFA device.
    PasswordMfa(String),
    KeyPair {
        encrypted_pem: String,
        password: Option<Vec<u8>>,
    },
    Oauth {
        token: String,
    },
    Jwt {
        token: String,
    },
    /// Nothing configured; login is left to whatever the server accepts.
    Unauthenticated,
}
