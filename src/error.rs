use tokio::task::JoinError;

/// Login error codes Snowflake returns when the presented credential is no
/// longer (or never was) accepted.
pub(crate) const AUTH_EXPIRED_CODES: &[&str] = &[
    // OAuth access token expired.
    "390318",
    // Invalid OAuth access token.
    "390303",
    // JWT token is invalid.
    "390144",
    // Authentication token has expired.
    "390114",
];

pub(crate) const AUTH_EXPIRED_MESSAGE: &str =
    "This error occurs when authentication has expired. Please reauth with your auth provider.";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to connect: {0}")]
    ConnectionFailed(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("communication error: {0}")]
    Communication(String),

    #[error("login rejected ({code}): {message}")]
    LoginRejected { code: String, message: String },

    #[error("session expired")]
    SessionExpired,

    #[error("unsupported authenticator: {0}")]
    UnsupportedAuthenticator(String),

    #[error("url error: {0}")]
    Url(String),

    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("json error: {0}, body: {1}")]
    Json(serde_json::Error, String),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("log filter error: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("pkcs8 error: {0}")]
    Pkcs8(#[from] pkcs8::Error),

    #[error("spki error: {0}")]
    Spki(#[from] pkcs8::spki::Error),

    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("future join error: {0}")]
    FutureJoin(#[from] JoinError),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Whether the driver rejected the login because the credential expired
    /// or is otherwise no longer valid.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Error::SessionExpired => true,
            Error::LoginRejected { code, .. } => AUTH_EXPIRED_CODES.contains(&code.as_str()),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_login_codes_are_classified() {
        for code in AUTH_EXPIRED_CODES {
            let err = Error::LoginRejected {
                code: code.to_string(),
                message: "token expired".to_string(),
            };
            assert!(err.is_auth_expired(), "{code} should be classified");
        }
        assert!(Error::SessionExpired.is_auth_expired());
    }

    #[test]
    fn test_other_errors_are_not_auth_expiry() {
        let wrong_password = Error::LoginRejected {
            code: "390100".to_string(),
            message: "Incorrect username or password was specified.".to_string(),
        };
        assert!(!wrong_password.is_auth_expired());
        assert!(!Error::Communication("503".to_string()).is_auth_expired());
        assert!(!Error::config("'schema' is a required field").is_auth_expired());
    }

    #[test]
    fn test_config_error_display_keeps_message() {
        let err = Error::config("'account' is required when using oauth or jwt");
        assert_eq!(
            err.to_string(),
            "configuration error: 'account' is required when using oauth or jwt"
        );
    }
}
