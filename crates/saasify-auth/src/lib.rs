//! Saasify Auth: identity adapter, tenant context resolution, access
//! guards and identity-provider webhook verification.

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod resolver;
pub mod selection;
pub mod token;
pub mod webhook;

pub use config::AuthConfig;
pub use error::AuthError;
pub use guard::{
    AccessGuard, AuthenticatedUser, RequestCredentials, TenantMembership,
    ensure_tenant_id_matches_param,
};
pub use identity::{ExternalIdentity, IdentityAdapter, IdentityProvider, JwtIdentityProvider};
pub use resolver::TenantContextResolver;
pub use token::SessionClaims;
pub use webhook::{WebhookEvent, WebhookHeaders};
