use std::fmt;

/// The `authenticator` profile setting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Authenticator {
    /// Unset (or `snowflake`): password or key-pair login.
    #[default]
    Default,
    OAuth,
    /// A pre-issued JWT handed to Snowflake as-is.
    Jwt,
    /// Key-pair login where the connector signs its own JWT.
    SnowflakeJwt,
    ExternalBrowser,
    UsernamePasswordMfa,
    /// Native Okta SSO, configured as the Okta endpoint URL.
    Okta(String),
    Other(String),
}

/// What a given authenticator needs from the rest of the profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AuthRequirement {
    /// Token flows identify the account from config; the user is carried by
    /// the token itself.
    AccountAndToken,
    /// Password or key material implies a login name and an account to log
    /// into. Nothing is required when no secret is configured.
    UserAndAccountWithSecret,
    /// Key-pair login always needs the key and the identity it signs for.
    KeyPair,
    /// A supplied password needs a login name to go with it.
    UserWithPassword,
}

impl Authenticator {
    /// Parses a profile value. Unknown values are kept verbatim in
    /// [`Authenticator::Other`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "" | "snowflake" => Authenticator::Default,
            "oauth" => Authenticator::OAuth,
            "jwt" => Authenticator::Jwt,
            "snowflake_jwt" => Authenticator::SnowflakeJwt,
            "externalbrowser" => Authenticator::ExternalBrowser,
            "username_password_mfa" => Authenticator::UsernamePasswordMfa,
            _ if lower.starts_with("https://") && lower.contains("okta.com") => {
                Authenticator::Okta(trimmed.to_string())
            }
            _ => Authenticator::Other(trimmed.to_string()),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Authenticator::Default)
    }

    pub(crate) fn requirement(&self) -> AuthRequirement {
        match self {
            Authenticator::OAuth | Authenticator::Jwt => AuthRequirement::AccountAndToken,
            Authenticator::Default => AuthRequirement::UserAndAccountWithSecret,
            Authenticator::SnowflakeJwt => AuthRequirement::KeyPair,
            Authenticator::ExternalBrowser
            | Authenticator::UsernamePasswordMfa
            | Authenticator::Okta(_)
            | Authenticator::Other(_) => AuthRequirement::UserWithPassword,
        }
    }
}

impl fmt::Display for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authenticator::Default => f.write_str("snowflake"),
            Authenticator::OAuth => f.write_str("oauth"),
            Authenticator::Jwt => f.write_str("jwt"),
            Authenticator::SnowflakeJwt => f.write_str("snowflake_jwt"),
            Authenticator::ExternalBrowser => f.write_str("externalbrowser"),
            Authenticator::UsernamePasswordMfa => f.write_str("username_password_mfa"),
            Authenticator::Okta(value) | Authenticator::Other(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Authenticator::parse("OAuth"), Authenticator::OAuth);
        assert_eq!(Authenticator::parse("JWT"), Authenticator::Jwt);
        assert_eq!(
            Authenticator::parse("ExternalBrowser"),
            Authenticator::ExternalBrowser
        );
        assert_eq!(Authenticator::parse("snowflake"), Authenticator::Default);
    }

    #[test]
    fn test_parse_okta_and_unknown() {
        assert_eq!(
            Authenticator::parse("https://example.okta.com"),
            Authenticator::Okta("https://example.okta.com".to_string())
        );
        assert_eq!(
            Authenticator::parse("programmatic_access_token"),
            Authenticator::Other("programmatic_access_token".to_string())
        );
    }

    #[test]
    fn test_token_flows_share_a_rule() {
        assert_eq!(
            Authenticator::OAuth.requirement(),
            Authenticator::Jwt.requirement()
        );
        assert_eq!(
            Authenticator::ExternalBrowser.requirement(),
            AuthRequirement::UserWithPassword
        );
    }
}
