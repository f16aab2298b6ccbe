//! Identity Provider Adapter.
//!
//! Turns a verified external identity into a local [`User`] and exposes the
//! caller's identity to the guards.

use saasify_core::error::SaasifyResult;
use saasify_core::models::user::{UpsertUser, User};
use saasify_core::repository::UserRepository;
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{SessionClaims, decode_session_token};

/// A verified identity as reported by the external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: String,
}

impl ExternalIdentity {
    /// Builds an identity from raw provider fields.
    ///
    /// Fails with [`AuthError::MissingEmail`] when the email is absent or
    /// blank.
    pub fn new(
        external_id: impl Into<String>,
        email: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Self, AuthError> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::MissingEmail)?;
        Ok(Self {
            external_id: external_id.into(),
            email: email.to_string(),
            first_name: first_name.map(str::trim).unwrap_or_default().to_string(),
            last_name: last_name.map(str::trim).unwrap_or_default().to_string(),
            avatar_url: avatar_url.unwrap_or_default().to_string(),
        })
    }

    /// First and last name joined by a space, skipping empty parts.
    pub fn display_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn into_upsert(self) -> UpsertUser {
        let name = self.display_name();
        UpsertUser {
            external_id: self.external_id,
            email: self.email,
            name,
            avatar_url: self.avatar_url,
        }
    }
}

impl TryFrom<SessionClaims> for ExternalIdentity {
    type Error = AuthError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        Self::new(
            claims.sub,
            claims.email.as_deref(),
            claims.given_name.as_deref(),
            claims.family_name.as_deref(),
            claims.picture.as_deref(),
        )
    }
}

/// Source of the current caller's identity.
pub trait IdentityProvider: Send + Sync {
    /// Returns the verified identity behind `session_token`, or `None` when
    /// there is no valid session or the identity has no usable email.
    fn current_identity(
        &self,
        session_token: Option<&str>,
    ) -> impl Future<Output = SaasifyResult<Option<ExternalIdentity>>> + Send;
}

/// Verifies provider-issued EdDSA session tokens locally.
#[derive(Debug, Clone)]
pub struct JwtIdentityProvider {
    config: AuthConfig,
}

impl JwtIdentityProvider {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    fn identity_from_token(&self, token: &str) -> Result<ExternalIdentity, AuthError> {
        let claims = decode_session_token(token, &self.config)?;
        ExternalIdentity::try_from(claims)
    }
}

impl IdentityProvider for JwtIdentityProvider {
    async fn current_identity(
        &self,
        session_token: Option<&str>,
    ) -> SaasifyResult<Option<ExternalIdentity>> {
        let Some(token) = session_token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        match self.identity_from_token(token) {
            Ok(identity) => Ok(Some(identity)),
            Err(AuthError::Crypto(msg)) => Err(AuthError::Crypto(msg).into()),
            Err(e) => {
                debug!(error = %e, "Session token not usable");
                Ok(None)
            }
        }
    }
}

/// Maps external identities onto local user records.
#[derive(Clone)]
pub struct IdentityAdapter<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> IdentityAdapter<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Idempotent create-or-refresh of the local user for `identity`.
    ///
    /// New users get the default platform role; existing users keep theirs
    /// while email, name, avatar and last sign-in are refreshed.
    pub async fn ensure_local_user(&self, identity: ExternalIdentity) -> SaasifyResult<User> {
        let user = self.users.upsert_by_external_id(identity.into_upsert()).await?;
        info!(user_id = %user.id, external_id = %user.external_id, "Local user ensured");
        Ok(user)
    }

    pub fn users(&self) -> &U {
        &self.users
    }
}
