//! Transport-agnostic failure payload.
//!
//! Services return [`Error`]; inbound adapters decide how it travels. The
//! HTTP adapter renders it as `{ code, message, traceId?, details? }`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Failure category, serialised in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input failed parsing or validation.
    InvalidRequest,
    /// No usable credentials.
    Unauthorized,
    /// Credentials are valid but the role is not allowed.
    Forbidden,
    /// The addressed user does not exist.
    NotFound,
    /// A unique field already holds the submitted value.
    Conflict,
    /// A backing service could not be reached.
    ServiceUnavailable,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// Message used when a caller supplies a blank one.
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Not allowed",
            Self::NotFound => "Not found",
            Self::Conflict => "Conflicting value",
            Self::ServiceUnavailable => "Service unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Domain error payload.
///
/// `message` is never blank. The trace id of the request in flight, if any,
/// is captured on construction.
///
/// # Examples
/// ```
/// use user_directory::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("User not found!");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(Error::conflict(" ").message(), "Conflicting value");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorPayload", into = "ErrorPayload")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Reasons a serialised error payload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorPayloadError {
    #[error("error message must not be blank")]
    BlankMessage,
    #[error("trace identifier must not be blank")]
    BlankTraceId,
}

macro_rules! code_constructors {
    ($($(#[$meta:meta])* $name:ident => $code:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )*
    };
}

impl Error {
    /// Build an error, substituting [`ErrorCode::fallback_message`] for a
    /// blank message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    code_constructors! {
        /// 400.
        invalid_request => InvalidRequest,
        /// 401.
        unauthorized => Unauthorized,
        /// 403.
        forbidden => Forbidden,
        /// 404.
        not_found => NotFound,
        /// 409.
        conflict => Conflict,
        /// 503.
        service_unavailable => ServiceUnavailable,
        /// 500; the message never reaches clients.
        internal => InternalError,
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Override the captured trace id. Blank ids are ignored.
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.trim().is_empty() {
            self.trace_id = Some(id);
        }
        self
    }

    /// Attach structured details, e.g. the offending field.
    ///
    /// # Examples
    /// ```
    /// use user_directory::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::conflict("name already taken")
    ///     .with_details(json!({ "field": "name" }));
    /// assert_eq!(err.details(), Some(&json!({ "field": "name" })));
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

/// Wire form of [`Error`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ErrorPayload {
    code: ErrorCode,
    message: String,
    #[serde(default, alias = "trace_id", skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorPayload {
    fn from(err: Error) -> Self {
        let Error {
            code,
            message,
            trace_id,
            details,
        } = err;
        Self {
            code,
            message,
            trace_id,
            details,
        }
    }
}

impl TryFrom<ErrorPayload> for Error {
    type Error = ErrorPayloadError;

    fn try_from(payload: ErrorPayload) -> Result<Self, Self::Error> {
        if payload.message.trim().is_empty() {
            return Err(ErrorPayloadError::BlankMessage);
        }
        if payload.trace_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ErrorPayloadError::BlankTraceId);
        }
        // A decoded payload keeps its own trace id, never the ambient one.
        Ok(Self {
            code: payload.code,
            message: payload.message,
            trace_id: payload.trace_id,
            details: payload.details,
        })
    }
}
