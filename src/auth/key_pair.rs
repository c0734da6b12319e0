use base64::{Engine, engine::general_purpose::STANDARD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

const JWT_LIFETIME_SECONDS: i64 = 600;

/// Signs a login JWT for key-pair authentication.
///
/// The issuer embeds the SHA-256 fingerprint of the public key, which is what
/// Snowflake matches against the key registered for the user.
pub(super) fn generate_jwt_from_key_pair(
    pem: &str,
    passphrase: Option<&[u8]>,
    user: &str,
    account: &str,
    timestamp: i64,
) -> Result<String> {
    // Only the account locator takes part in the claims, never the region.
    let account = account
        .split('.')
        .next()
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_default();
    let user = user.to_ascii_uppercase();

    let private = parse_private_key(pem, passphrase)?;
    let fingerprint = public_key_fingerprint(&private)?;

    let claims = json!({
        "iss": format!("{account}.{user}.SHA256:{fingerprint}"),
        "sub": format!("{account}.{user}"),
        "iat": timestamp,
        "exp": timestamp + JWT_LIFETIME_SECONDS
    });
    let key = EncodingKey::from_rsa_pem(private.to_pkcs8_pem(LineEnding::LF)?.as_bytes())?;
    let header = Header {
        alg: Algorithm::RS256,
        ..Default::default()
    };
    Ok(jsonwebtoken::encode(&header, &claims, &key)?)
}

fn public_key_fingerprint(private: &RsaPrivateKey) -> Result<String> {
    let der = private.to_public_key().to_public_key_der()?;
    let hash = Sha256::digest(der.as_bytes());
    Ok(STANDARD.encode(hash))
}

fn parse_private_key(pem: &str, passphrase: Option<&[u8]>) -> Result<RsaPrivateKey> {
    if let Some(passphrase) = passphrase {
        if let Ok(private) = RsaPrivateKey::from_pkcs8_encrypted_pem(pem, passphrase) {
            return Ok(private);
        }
    }

    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| Error::Decode(format!("failed to parse private key: {e}")))
}
