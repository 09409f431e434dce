//! Test helpers for inbound HTTP components.

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::ports::{
    AccessTokenVerifier, FixtureMediaStore, MediaStore, MockUsersCommand, MockUsersQuery,
    TokenVerificationError,
};
use crate::domain::{Principal, Role};
use crate::inbound::http::state::{HttpLimits, HttpState, HttpStatePorts};

/// Verifier treating the bearer token as a role name.
///
/// `Bearer SUPERUSER` authenticates as subject `test-SUPERUSER` holding
/// [`Role::Superuser`]; anything that is not a role name is rejected.
pub struct RoleTokenVerifier;

impl AccessTokenVerifier for RoleTokenVerifier {
    fn verify(&self, token: &str) -> Result<Principal, TokenVerificationError> {
        let role = Role::from_str(token)
            .map_err(|_| TokenVerificationError::malformed("not a role name"))?;
        Ok(Principal::new(format!("test-{token}"), role))
    }
}

/// `Authorization` header value for a caller holding `role`.
pub fn bearer(role: Role) -> (&'static str, String) {
    ("Authorization", format!("Bearer {role}"))
}

/// Build handler state from mocked driving ports and a media store.
pub fn state_from(
    users_query: MockUsersQuery,
    users_command: MockUsersCommand,
    media: Arc<dyn MediaStore>,
) -> HttpState {
    HttpState::new(
        HttpStatePorts {
            users_query: Arc::new(users_query),
            users_command: Arc::new(users_command),
            media,
            tokens: Arc::new(RoleTokenVerifier),
        },
        HttpLimits::default(),
    )
}

/// Build handler state whose only working port is `tokens`.
pub fn state_with_tokens(tokens: Arc<dyn AccessTokenVerifier>) -> HttpState {
    HttpState::new(
        HttpStatePorts {
            users_query: Arc::new(MockUsersQuery::new()),
            users_command: Arc::new(MockUsersCommand::new()),
            media: Arc::new(FixtureMediaStore),
            tokens,
        },
        HttpLimits::default(),
    )
}
