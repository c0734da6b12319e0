use std::time::Duration;

use serde_json::json;

pub(crate) fn client_app_id() -> &'static str {
    env!("CARGO_PKG_NAME")
}

pub(crate) fn client_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub(crate) fn user_agent() -> String {
    format!("{}/{}", client_app_id(), client_app_version())
}

pub(super) fn client_environment(timeout: Option<Duration>) -> serde_json::Value {
    json!({
        "APPLICATION": client_app_id(),
        "OCSP_MODE": "FAIL_OPEN",
        "TRACING": 0,
        "LOGIN_TIMEOUT": timeout.map(|t| t.as_secs() as i64),
        "NETWORK_TIMEOUT": timeout.map(|t| t.as_secs() as i64),
        "SOCKET_TIMEOUT": timeout.map(|t| t.as_secs() as i64),
    })
}
