//! Bearer-token access gate.
//!
//! Token validation itself belongs to the backend; this module only parses
//! the `Authorization` header, hands the token to a [`TokenValidator`] and
//! maps the outcome onto [`AuthError`] (401 / 403 / 500).

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
}

/// Why a validator refused a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRejection {
    Invalid(String),
    Expired,
    /// The validator itself failed (key store down, etc.).
    Unavailable(String),
}

pub trait TokenValidator {
    fn validate(&self, token: &str) -> Result<Principal, TokenRejection>;
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Check a request's `Authorization` header.
///
/// # Errors
/// - [`AuthError::MissingToken`] when there is no usable bearer token
/// - [`AuthError::InvalidToken`] when the validator rejects it
/// - [`AuthError::Internal`] when the validator is unavailable
pub fn authorize(
    header: Option<&str>,
    validator: &dyn TokenValidator,
) -> Result<Principal, AuthError> {
    let token = extract_bearer_token(header).ok_or(AuthError::MissingToken)?;
    validator.validate(token).map_err(|rejection| {
        let err = match rejection {
            TokenRejection::Invalid(reason) => AuthError::InvalidToken(reason),
            TokenRejection::Expired => AuthError::InvalidToken("token expired".into()),
            TokenRejection::Unavailable(reason) => AuthError::Internal(reason),
        };
        tracing::debug!(status = err.status_code(), error = %err, "access denied");
        err
    })
}

/// The only thing the engines need to know about authentication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl AuthState {
    pub fn from_header(header: Option<&str>, validator: &dyn TokenValidator) -> Self {
        match authorize(header, validator) {
            Ok(principal) => AuthState::Authenticated(principal),
            Err(_) => AuthState::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// # Errors
    /// [`AuthError::MissingToken`] when anonymous.
    pub fn require(&self) -> Result<&Principal, AuthError> {
        match self {
            AuthState::Authenticated(p) => Ok(p),
            AuthState::Anonymous => Err(AuthError::MissingToken),
        }
    }
}
