use std::collections::HashMap;
use std::ffi::OsString;

pub const SNOWFLAKE_ACCOUNT: &str = "SNOWFLAKE_ACCOUNT";
pub const SNOWFLAKE_USER: &str = "SNOWFLAKE_USER";
pub const DEBUG_LOGGING: &str = "DBT_SNOWFLAKE_CONNECTOR_DEBUG_LOGGING";

/// A point-in-time copy of environment variables.
///
/// Resolution and logging setup read from a snapshot rather than the live
/// process environment, so the same inputs always produce the same result and
/// a snapshot can be handed to another thread.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// An empty snapshot, as if every variable were unset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        vars.into_iter()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Returns `true` when the variable is set to a non-empty value.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
