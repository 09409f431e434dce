//! HTTP inbound adapter exposing the user directory REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod user_update;
pub mod users;
pub mod validation;

pub use error::ApiResult;
