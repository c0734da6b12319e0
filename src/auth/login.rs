use std::time::Duration;

use chrono::Utc;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use super::client::{client_app_id, client_app_version, client_environment, user_agent};
use super::key_pair::generate_jwt_from_key_pair;
use crate::driver::DRIVER_LOG_TARGET;
use crate::types::SnowflakeResponse;
use crate::{Error, Result, SnowflakeAuthMethod, SnowflakeCredentials};

/// `https://{account}.snowflakecomputing.com`, unless an explicit host is
/// configured.
pub(crate) fn get_base_url(credentials: &SnowflakeCredentials) -> Result<Url> {
    if let Some(host) = credentials.host() {
        let protocol = credentials.protocol().unwrap_or("https");
        let mut url = Url::parse(&format!("{protocol}://{host}"))?;
        if let Some(port) = credentials.port() {
            url.set_port(Some(port))
                .map_err(|_| Error::Url("invalid base url port".to_string()))?;
        }
        Ok(url)
    } else if let Some(account) = credentials.account() {
        Ok(Url::parse(&format!("https://{account}.snowflakecomputing.com"))?)
    } else {
        Err(Error::Url(
            "either 'account' or 'host' is needed to reach Snowflake".to_string(),
        ))
    }
}

/// Login to Snowflake and return a session token.
pub(crate) async fn login(
    http: &Client,
    base_url: &Url,
    credentials: &SnowflakeCredentials,
    auth: &SnowflakeAuthMethod,
) -> Result<String> {
    let url = base_url.join("session/v1/login-request")?;
    let timeout = credentials.connect_timeout().map(Duration::from_secs);

    let request_id = Uuid::new_v4().to_string();
    let mut queries: Vec<(&str, &str)> = vec![
        ("warehouse", credentials.warehouse()),
        ("databaseName", credentials.database()),
        ("schemaName", credentials.schema()),
        ("request_id", request_id.as_str()),
    ];
    if let Some(role) = credentials.role() {
        queries.push(("roleName", role));
    }

    let login_data = login_request_data(credentials, auth, timeout)?;
    debug!(
        target: DRIVER_LOG_TARGET,
        %url,
        authenticator = %credentials.authenticator(),
        "sending login request"
    );

    let mut request = http
        .post(url)
        .query(&queries)
        .header(ACCEPT, "application/snowflake")
        .header(USER_AGENT, user_agent())
        .json(&json!({
            "data": login_data
        }));
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let resp = request.send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(Error::Communication(body));
    }

    let parsed: SnowflakeResponse<LoginResponseData> =
        serde_json::from_str(&body).map_err(|e| Error::Json(e, body))?;
    if !parsed.success {
        return Err(Error::LoginRejected {
            code: parsed.code.unwrap_or_default(),
            message: parsed.message.unwrap_or_default(),
        });
    }

    parsed
        .data
        .and_then(|data| data.token)
        .ok_or_else(|| Error::Communication("missing login-response token".to_string()))
}

fn base_login_request_data(credentials: &SnowflakeCredentials, timeout: Option<Duration>) -> Value {
    let mut data = json!({
        "ACCOUNT_NAME": credentials.account().unwrap_or_default(),
        "CLIENT_APP_ID": client_app_id(),
        "CLIENT_APP_VERSION": client_app_version(),
        "CLIENT_ENVIRONMENT": client_environment(timeout),
    });
    if let Some(obj) = data.as_object_mut() {
        if let Some(user) = credentials.user() {
            obj.insert("LOGIN_NAME".to_string(), json!(user));
        }
        if credentials.client_session_keep_alive() {
            obj.insert(
                "SESSION_PARAMETERS".to_string(),
                json!({ "CLIENT_SESSION_KEEP_ALIVE": true }),
            );
        }
    }
    data
}

fn login_request_data(
    credentials: &SnowflakeCredentials,
    auth: &SnowflakeAuthMethod,
    timeout: Option<Duration>,
) -> Result<Value> {
    let mut data = base_login_request_data(credentials, timeout);
    let extra = match auth {
        SnowflakeAuthMethod::Password(password) => json!({
            "PASSWORD": password
        }),
        SnowflakeAuthMethod::PasswordMfa(password) => json!({
            "PASSWORD": password,
            "AUTHENTICATOR": "USERNAME_PASSWORD_MFA",
            "EXT_AUTHN_DUO_METHOD": "push"
        }),
        SnowflakeAuthMethod::KeyPair {
            encrypted_pem,
            password,
        } => {
            let user = credentials
                .user()
                .ok_or_else(|| Error::config("'user' is required for this authenticator"))?;
            let account = credentials
                .account()
                .ok_or_else(|| Error::config("'account' is a required field"))?;
            let jwt = generate_jwt_from_key_pair(
                encrypted_pem,
                password.as_deref(),
                user,
                account,
                Utc::now().timestamp(),
            )?;
            json!({
                "TOKEN": jwt,
                "AUTHENTICATOR": "SNOWFLAKE_JWT"
            })
        }
        SnowflakeAuthMethod::Oauth { token } => json!({
            "AUTHENTICATOR": "OAUTH",
            "TOKEN": token
        }),
        SnowflakeAuthMethod::Jwt { token } => json!({
            "AUTHENTICATOR": "SNOWFLAKE_JWT",
            "TOKEN": token
        }),
        SnowflakeAuthMethod::Unauthenticated => json!({}),
    };
    if let (Some(obj), Some(extra)) = (data.as_object_mut(), extra.as_object()) {
        obj.extend(extra.clone());
    }
    Ok(data)
}

#[derive(serde::Deserialize)]
struct LoginResponseData {
    token: Option<String>,
}
