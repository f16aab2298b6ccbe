//! Authentication error types.

use saasify_core::error::SaasifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("identity has no usable email")]
    MissingEmail,

    #[error("webhook signature rejected: {0}")]
    WebhookSignature(String),

    #[error("malformed webhook payload: {0}")]
    WebhookPayload(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for SaasifyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::WebhookSignature(_) => SaasifyError::Unauthenticated,
            AuthError::MissingEmail => SaasifyError::invalid_field("email", err.to_string()),
            AuthError::WebhookPayload(msg) => SaasifyError::invalid(msg),
            AuthError::Crypto(msg) => SaasifyError::Crypto(msg),
        }
    }
}
