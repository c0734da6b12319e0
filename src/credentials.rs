use std::fmt;

use tracing::debug;

use crate::authenticator::AuthRequirement;
use crate::environment::{SNOWFLAKE_ACCOUNT, SNOWFLAKE_USER};
use crate::{Authenticator, Environment, Error, ProfileFields, Result, SnowflakeAuthMethod};

const UNIQUE_FIELD_DEFAULT: &str = "default";

const CONNECTION_KEYS: &[&str] = &[
    "account",
    "user",
    "database",
    "warehouse",
    "role",
    "schema",
    "authenticator",
    "host",
    "port",
    "query_tag",
    "client_session_keep_alive",
];

/// Fully resolved and validated Snowflake connection parameters.
///
/// Built only through [`SnowflakeCredentials::resolve`], which fails fast on
/// an inconsistent profile. The value is immutable afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct SnowflakeCredentials {
    account: Option<String>,
    user: Option<String>,
    password: Option<String>,
    authenticator: Authenticator,
    token: Option<String>,
    database: String,
    warehouse: String,
    schema: String,
    role: Option<String>,

    private_key: Option<String>,
    private_key_passphrase: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    protocol: Option<String>,
    query_tag: Option<String>,
    connect_timeout: Option<u64>,
    client_session_keep_alive: bool,
}

impl SnowflakeCredentials {
    /// Resolves profile fields against an environment snapshot.
    ///
    /// `account` and `user` fall back to `SNOWFLAKE_ACCOUNT` and
    /// `SNOWFLAKE_USER` only when the profile omits them entirely. The
    /// account is rewritten with hyphens in place of underscores before any
    /// check runs.
    pub fn resolve(fields: ProfileFields, env: &Environment) -> Result<Self> {
        let account = profile_or_env(fields.account, env, SNOWFLAKE_ACCOUNT)
            .map(|account| canonicalize_account(&account));
        let user = profile_or_env(fields.user, env, SNOWFLAKE_USER);
        let authenticator = fields
            .authenticator
            .as_deref()
            .map(Authenticator::parse)
            .unwrap_or_default();

        let password = non_empty(fields.password);
        let token = non_empty(fields.token);
        let private_key = non_empty(fields.private_key);

        check_authenticator(
            &authenticator,
            Identity {
                account: account.as_deref(),
                user: user.as_deref(),
                password: password.as_deref(),
                token: token.as_deref(),
                private_key: private_key.as_deref(),
            },
        )?;

        let database = required(fields.database, "database")?;
        let warehouse = required(fields.warehouse, "warehouse")?;
        let schema = required(fields.schema, "schema")?;

        Ok(Self {
            account,
            user,
            password,
            authenticator,
            token,
            database,
            warehouse,
            schema,
            role: non_empty(fields.role),
            private_key,
            private_key_passphrase: non_empty(fields.private_key_passphrase),
            host: non_empty(fields.host),
            port: fields.port,
            protocol: non_empty(fields.protocol),
            query_tag: non_empty(fields.query_tag),
            connect_timeout: fields.connect_timeout,
            client_session_keep_alive: fields.client_session_keep_alive.unwrap_or(false),
        })
    }

    pub fn type_name(&self) -> &'static str {
        "snowflake"
    }

    /// The account if one is configured, otherwise `"default"`.
    pub fn unique_field(&self) -> &str {
        self.account.as_deref().unwrap_or(UNIQUE_FIELD_DEFAULT)
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn warehouse(&self) -> &str {
        &self.warehouse
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn query_tag(&self) -> Option<&str> {
        self.query_tag.as_deref()
    }

    pub fn connect_timeout(&self) -> Option<u64> {
        self.connect_timeout
    }

    pub fn client_session_keep_alive(&self) -> bool {
        self.client_session_keep_alive
    }

    /// Keys shown when describing the connection to a user.
    pub fn connection_keys() -> &'static [&'static str] {
        CONNECTION_KEYS
    }

    /// `(key, value)` pairs for [`Self::connection_keys`]. Secrets are never
    /// part of the output.
    pub fn connection_info(&self) -> Vec<(&'static str, Option<String>)> {
        CONNECTION_KEYS
            .iter()
            .map(|&key| {
                let value = match key {
                    "account" => self.account.clone(),
                    "user" => self.user.clone(),
                    "database" => Some(self.database.clone()),
                    "warehouse" => Some(self.warehouse.clone()),
                    "role" => self.role.clone(),
                    "schema" => Some(self.schema.clone()),
                    "authenticator" => Some(self.authenticator.to_string()),
                    "host" => self.host.clone(),
                    "port" => self.port.map(|p| p.to_string()),
                    "query_tag" => self.query_tag.clone(),
                    "client_session_keep_alive" => {
                        Some(self.client_session_keep_alive.to_string())
                    }
                    _ => None,
                };
                (key, value)
            })
            .collect()
    }

    /// Picks the login method a driver should use for these credentials.
    pub fn auth_method(&self) -> Result<SnowflakeAuthMethod> {
        let key_pair = |pem: &str| SnowflakeAuthMethod::KeyPair {
            encrypted_pem: pem.to_string(),
            password: self
                .private_key_passphrase
                .as_ref()
                .map(|p| p.as_bytes().to_vec()),
        };
        match &self.authenticator {
            Authenticator::Default => Ok(match (&self.private_key, &self.password) {
                (Some(pem), _) => key_pair(pem.as_str()),
                (None, Some(password)) => SnowflakeAuthMethod::Password(password.clone()),
                (None, None) => SnowflakeAuthMethod::Unauthenticated,
            }),
            Authenticator::SnowflakeJwt => self
                .private_key
                .as_deref()
                .map(key_pair)
                .ok_or_else(|| Error::config("'private_key' is required for this authenticator")),
            Authenticator::OAuth => Ok(SnowflakeAuthMethod::Oauth {
                token: self.token.clone().unwrap_or_default(),
            }),
            Authenticator::Jwt => Ok(SnowflakeAuthMethod::Jwt {
                token: self.token.clone().unwrap_or_default(),
            }),
            Authenticator::UsernamePasswordMfa => self
                .password
                .clone()
                .map(SnowflakeAuthMethod::PasswordMfa)
                .ok_or_else(|| {
                    Error::UnsupportedAuthenticator(
                        "username_password_mfa without a password".to_string(),
                    )
                }),
            other => Err(Error::UnsupportedAuthenticator(other.to_string())),
        }
    }
}

impl fmt::Debug for SnowflakeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("SnowflakeCredentials")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("authenticator", &self.authenticator)
            .field("token", &redact(&self.token))
            .field("database", &self.database)
            .field("warehouse", &self.warehouse)
            .field("schema", &self.schema)
            .field("role", &self.role)
            .field("private_key", &redact(&self.private_key))
            .field(
                "private_key_passphrase",
                &redact(&self.private_key_passphrase),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("query_tag", &self.query_tag)
            .field("connect_timeout", &self.connect_timeout)
            .field("client_session_keep_alive", &self.client_session_keep_alive)
            .finish()
    }
}

/// The identity-related fields the authenticator rules look at.
#[derive(Clone, Copy)]
struct Identity<'a> {
    account: Option<&'a str>,
    user: Option<&'a str>,
    password: Option<&'a str>,
    token: Option<&'a str>,
    private_key: Option<&'a str>,
}

fn check_authenticator(authenticator: &Authenticator, identity: Identity<'_>) -> Result<()> {
    match authenticator.requirement() {
        AuthRequirement::AccountAndToken => {
            if identity.account.is_none() {
                return Err(Error::config(
                    "'account' is required when using oauth or jwt",
                ));
            }
            if identity.token.is_none() {
                return Err(Error::config("'token' is required when using oauth or jwt"));
            }
        }
        AuthRequirement::UserAndAccountWithSecret => {
            if identity.password.is_some() || identity.private_key.is_some() {
                require_user(identity)?;
                require_account(identity)?;
            }
        }
        AuthRequirement::KeyPair => {
            require_user(identity)?;
            require_account(identity)?;
            if identity.private_key.is_none() {
                return Err(Error::config(
                    "'private_key' is required for this authenticator",
                ));
            }
        }
        AuthRequirement::UserWithPassword => {
            if identity.password.is_some() {
                require_user(identity)?;
            }
        }
    }
    Ok(())
}

fn require_user(identity: Identity<'_>) -> Result<()> {
    match identity.user {
        Some(_) => Ok(()),
        None => Err(Error::config("'user' is required for this authenticator")),
    }
}

fn require_account(identity: Identity<'_>) -> Result<()> {
    match identity.account {
        Some(_) => Ok(()),
        None => Err(missing_field("account")),
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| missing_field(field))
}

fn missing_field(field: &str) -> Error {
    Error::config(format!("'{field}' is a required field"))
}

/// An explicit profile value, even an empty one, shadows the environment.
fn profile_or_env(profile: Option<String>, env: &Environment, key: &str) -> Option<String> {
    match profile {
        Some(value) => non_empty(Some(value)),
        None => {
            let value = env.get(key).filter(|v| !v.is_empty())?;
            debug!(variable = key, "falling back to environment variable");
            Some(value.to_string())
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn canonicalize_account(account: &str) -> String {
    account.replace('_', "-")
}
