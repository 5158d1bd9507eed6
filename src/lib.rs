//! # Blogauth
//!
//! Token-based authentication for the blog API.
//!
//! ## Accounts
//!
//! Accounts are created through sign-up with a unique username, a password and
//! an email address. Passwords are stored as salted Argon2id hashes. An account
//! is either `ACTIVE` or `LOCKED`; locking is an administrative action and a
//! locked account can no longer authenticate.
//!
//! ## Tokens
//!
//! A successful login returns a signed, self-contained token (HS512) in the
//! `Authorization` response header. The token carries the account id and an
//! expiry; validating it needs only the signing key and a directory lookup.
//! Tokens are not stored, so logout cannot revoke them: a token stays valid
//! until it expires or its account is locked.
//!
//! ## Protected endpoints
//!
//! Every protected request re-runs the full chain (signature, expiry, account
//! lookup, lock check) and hands the resulting principal to the handler
//! explicitly.

pub mod api;
pub mod auth;
pub mod cli;
pub mod directory;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
