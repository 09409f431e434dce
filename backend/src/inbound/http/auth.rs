//! Bearer-token authentication for HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! credential checks and caller identity derivation here. Handlers take an
//! [`Authenticated`] argument and call [`Authenticated::require_any_role`]
//! when the route is restricted.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::{debug, warn};

use crate::domain::ports::TokenVerificationError;
use crate::domain::{Error, Principal, Role};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Roles allowed to update a profile or soft delete a user.
pub const PROFILE_EDITORS: &[Role] = &[Role::Superuser, Role::Member];
/// Roles allowed to restore or permanently delete a user.
pub const SUPERUSERS_ONLY: &[Role] = &[Role::Superuser];

/// Verified caller extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct Authenticated(Principal);

impl Authenticated {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    /// Return `403 Forbidden` unless the caller holds one of `allowed`.
    pub fn require_any_role(&self, allowed: &[Role]) -> Result<(), Error> {
        self.0.require_any_role(allowed).inspect_err(|_| {
            debug!(
                subject = self.0.subject(),
                role = %self.0.role(),
                "caller role not permitted"
            );
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid ASCII"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

fn map_verification_error(error: TokenVerificationError) -> Error {
    debug!(%error, "access token rejected");
    match error {
        TokenVerificationError::Expired => Error::unauthorized("access token has expired"),
        _ => Error::unauthorized("invalid access token"),
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let Some(state) = req.app_data::<web::Data<HttpState>>() else {
        warn!("HttpState missing from application data");
        return Err(Error::internal("authentication is not configured"));
    };
    let token = bearer_token(req)?;
    let principal = state
        .tokens
        .verify(token)
        .map_err(map_verification_error)?;
    Ok(Authenticated(principal))
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::ports::MockAccessTokenVerifier;
    use crate::inbound::http::test_utils::state_with_tokens;

    async fn whoami(caller: Authenticated) -> Result<HttpResponse, Error> {
        caller.require_any_role(SUPERUSERS_ONLY)?;
        Ok(HttpResponse::Ok().body(caller.principal().subject().to_owned()))
    }

    async fn call(verifier: MockAccessTokenVerifier, header: Option<&str>) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with_tokens(Arc::new(verifier))))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer "))]
    #[actix_web::test]
    async fn missing_or_malformed_header_is_unauthorised(#[case] header: Option<&str>) {
        let mut verifier = MockAccessTokenVerifier::new();
        verifier.expect_verify().never();

        let (status, body) = call(verifier, header).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.get("code").and_then(Value::as_str), Some("unauthorized"));
    }

    #[rstest]
    #[case(TokenVerificationError::expired(), "access token has expired")]
    #[case(TokenVerificationError::invalid_signature(), "invalid access token")]
    #[case(TokenVerificationError::malformed("bad base64"), "invalid access token")]
    #[actix_web::test]
    async fn rejected_tokens_are_unauthorised(
        #[case] failure: TokenVerificationError,
        #[case] message: &str,
    ) {
        let mut verifier = MockAccessTokenVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .return_once(move |_| Err(failure));

        let (status, body) = call(verifier, Some("Bearer abc.def.ghi")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.get("message").and_then(Value::as_str), Some(message));
    }

    #[rstest]
    #[actix_web::test]
    async fn verified_token_without_role_is_forbidden() {
        let mut verifier = MockAccessTokenVerifier::new();
        verifier
            .expect_verify()
            .withf(|token| token == "abc.def.ghi")
            .return_once(|_| Ok(Principal::new("u-1", Role::Member)));

        let (status, body) = call(verifier, Some("Bearer abc.def.ghi")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.get("code").and_then(Value::as_str), Some("forbidden"));
    }

    #[rstest]
    #[actix_web::test]
    async fn superuser_passes_the_guard() {
        let mut verifier = MockAccessTokenVerifier::new();
        verifier
            .expect_verify()
            .return_once(|_| Ok(Principal::new("u-1", Role::Superuser)));

        let (status, _) = call(verifier, Some("Bearer abc.def.ghi")).await;

        assert_eq!(status, StatusCode::OK);
    }
}
