use serde::Deserialize;

use crate::Result;

/// Raw connection fields as they appear in a profile target.
///
/// Every field is optional here; [`SnowflakeCredentials::resolve`] decides
/// which ones are required.
///
/// [`SnowflakeCredentials::resolve`]: crate::SnowflakeCredentials::resolve
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileFields {
    pub account: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub authenticator: Option<String>,
    pub token: Option<String>,
    pub database: Option<String>,
    pub warehouse: Option<String>,
    pub schema: Option<String>,
    pub role: Option<String>,

    pub private_key: Option<String>,
    pub private_key_passphrase: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub query_tag: Option<String>,
    pub connect_timeout: Option<u64>,
    pub client_session_keep_alive: Option<bool>,
}

impl ProfileFields {
    /// Reads a single target block, e.g. the `outputs.dev` mapping of a
    /// profiles file. Keys this crate does not know about (`type`,
    /// `threads`, ...) are ignored.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_str_reads_target_block() {
        let yaml = r#"
type: snowflake
threads: 4
account: my_account
user: alice
password: hunter2
database: ANALYTICS
warehouse: TRANSFORMING
schema: PUBLIC
port: 8443
client_session_keep_alive: true
"#;
        let fields = ProfileFields::from_yaml_str(yaml).unwrap();
        assert_eq!(fields.account.as_deref(), Some("my_account"));
        assert_eq!(fields.user.as_deref(), Some("alice"));
        assert_eq!(fields.port, Some(8443));
        assert_eq!(fields.client_session_keep_alive, Some(true));
        assert_eq!(fields.authenticator, None);
    }

    #[test]
    fn test_from_yaml_str_rejects_bad_types() {
        let result = ProfileFields::from_yaml_str("port: not-a-number");
        assert!(matches!(result, Err(crate::Error::Yaml(_))));
    }
}
