//! Token-based authentication core.
//!
//! - `password`: salted Argon2id hashing of stored credentials.
//! - `token`: HS512 identity tokens bound to an account id.
//! - `credential` / `authority`: classify the `Authorization` header and
//!   resolve it into a [`Principal`] through a registry of handlers.
//! - `session`: login, logout and sign-up.
//! - `state`: configuration and the shared per-process state.

pub mod authority;
pub mod credential;
mod error;
pub mod password;
pub mod principal;
pub mod session;
pub mod state;
pub mod token;

pub use error::AuthError;
pub use principal::{require_auth, Principal};
pub use state::{AuthConfig, AuthState};
