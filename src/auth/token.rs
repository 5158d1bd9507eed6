//! Signed identity tokens (compact JWS, HS512).
//!
//! A token is `base64url(header).base64url(claims).base64url(signature)` where
//! the claims carry the account id as `sub` plus `iat`/`exp` in unix seconds.
//! Parsing checks structure, then the signature, then expiry; it never looks
//! the subject up, that is the authority's job.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::{fmt, time::Duration};
use thiserror::Error;
use time::OffsetDateTime;

type HmacSha512 = Hmac<Sha512>;

/// Minimum signing key length in bytes.
pub const MIN_KEY_LENGTH: usize = 32;
/// Default validity window: 7 days.
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

const ALG: &str = "HS512";
const TYP: &str = "JWT";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct TokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Verified contents of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claims {
    pub subject: i64,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("failed to encode token")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("token signing key must be at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
    #[error("invalid token signing key")]
    Invalid,
}

/// Process-wide signing key shared by issuance and validation.
#[derive(Clone)]
pub struct TokenKey(SecretString);

impl TokenKey {
    /// Wrap a configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::TooShort`] if the secret is shorter than [`MIN_KEY_LENGTH`].
    pub fn new(secret: SecretString) -> Result<Self, KeyError> {
        let actual = secret.expose_secret().len();
        if actual < MIN_KEY_LENGTH {
            return Err(KeyError::TooShort {
                min: MIN_KEY_LENGTH,
                actual,
            });
        }
        Ok(Self(secret))
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenKey(***)")
    }
}

/// Issues and parses identity tokens.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha512,
    ttl_seconds: i64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("mac", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    /// # Errors
    ///
    /// Returns [`KeyError::Invalid`] if the key cannot initialise HMAC.
    pub fn new(key: &TokenKey, ttl: Duration) -> Result<Self, KeyError> {
        let mac = HmacSha512::new_from_slice(key.0.expose_secret().as_bytes())
            .map_err(|_| KeyError::Invalid)?;
        Ok(Self {
            mac,
            ttl_seconds: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `subject` valid from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if the header or claims cannot be serialized.
    pub fn issue(&self, subject: i64) -> Result<String, TokenError> {
        self.issue_at(subject, now_unix())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if the header or claims cannot be serialized.
    pub fn issue_at(&self, subject: i64, now: i64) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        };
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };
        let header_b64 = b64e_json(&header)?;
        let claims_b64 = b64e_json(&claims)?;
        let signature_b64 = self.sign(&header_b64, &claims_b64);
        Ok(format!("{header_b64}.{claims_b64}.{signature_b64}"))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] if the token cannot be decoded,
    /// - [`TokenError::InvalidSignature`] if the signature does not match,
    /// - [`TokenError::Expired`] if the token is past its expiry.
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        self.parse_at(token, now_unix())
    }

    /// Verify a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Same as [`TokenCodec::parse`].
    pub fn parse_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.trim().split('.');
        let header_b64 = parts.next().ok_or(TokenError::Malformed)?;
        let claims_b64 = parts.next().ok_or(TokenError::Malformed)?;
        let signature_b64 = parts.next().ok_or(TokenError::Malformed)?;
        if parts.next().is_some() {
            return Err(TokenError::Malformed);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALG || header.typ != TYP {
            return Err(TokenError::Malformed);
        }

        let signature =
            Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac.clone();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: TokenClaims = b64d_json(claims_b64)?;
        let subject = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)?;
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Claims {
            subject,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    fn sign(&self, header_b64: &str, claims_b64: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes())
    }
}

fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
