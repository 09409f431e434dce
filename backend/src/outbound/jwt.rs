//! HS256 bearer token verification backed by `jsonwebtoken`.
//!
//! Tokens carry `sub`, `role` and `exp`. A role outside the known set is
//! refused here rather than at the route guard so handlers only ever see a
//! valid [`Role`].

use std::str::FromStr;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{AccessTokenVerifier, TokenVerificationError};
use crate::domain::{Principal, Role};

/// Claims expected in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: String,
    pub exp: u64,
}

/// Verifies HS256 access tokens signed with a shared secret.
pub struct JwtAccessTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAccessTokenVerifier {
    /// Build a verifier for `secret`, tolerating `leeway_seconds` of clock
    /// skew on `exp`.
    ///
    /// # Examples
    /// ```
    /// use user_directory::outbound::jwt::JwtAccessTokenVerifier;
    /// use user_directory::domain::ports::AccessTokenVerifier;
    ///
    /// let verifier = JwtAccessTokenVerifier::new("secret", 30);
    /// assert!(verifier.verify("not-a-jwt").is_err());
    /// ```
    pub fn new(secret: impl Into<String>, leeway_seconds: u64) -> Self {
        let secret = Zeroizing::new(secret.into());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

fn map_decode_error(error: &jsonwebtoken::errors::Error) -> TokenVerificationError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenVerificationError::expired(),
        ErrorKind::InvalidSignature => TokenVerificationError::invalid_signature(),
        ErrorKind::MissingRequiredClaim(claim) => {
            TokenVerificationError::malformed(format!("missing {claim} claim"))
        }
        _ => TokenVerificationError::malformed(error.to_string()),
    }
}

impl AccessTokenVerifier for JwtAccessTokenVerifier {
    fn verify(&self, token: &str) -> Result<Principal, TokenVerificationError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|err| {
            debug!(error = %err, "access token rejected");
            map_decode_error(&err)
        })?;
        let claims = data.claims;
        let role = Role::from_str(&claims.role)
            .map_err(|_| TokenVerificationError::unknown_role(claims.role.clone()))?;
        Ok(Principal::new(claims.sub, role))
    }
}
