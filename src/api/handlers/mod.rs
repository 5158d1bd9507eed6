//! API handlers for the blog authentication endpoints.

pub mod error;
pub mod health;
pub mod login;
pub mod logout;
pub mod me;
pub mod signup;

pub use self::error::{ApiError, ErrorBody};
