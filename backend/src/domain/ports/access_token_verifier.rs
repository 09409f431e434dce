//! Driven port for verifying bearer access tokens.

use crate::domain::Principal;

use super::define_port_error;

define_port_error! {
    /// Reasons a bearer token is refused.
    pub enum TokenVerificationError {
        /// The token could not be decoded.
        Malformed { message: String } => "access token is malformed: {message}",
        /// The token is past its expiry.
        Expired => "access token has expired",
        /// The signature does not match.
        InvalidSignature => "access token signature is invalid",
        /// The role claim names no known role.
        UnknownRole { value: String } => "access token carries unknown role {value}",
    }
}

/// Port turning a bearer credential into a [`Principal`].
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal, TokenVerificationError>;
}
