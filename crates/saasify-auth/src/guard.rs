//! Access guards.
//!
//! Each guard builds on the previous one and either yields a capability
//! value or fails with a typed [`SaasifyError`]. Guards never redirect;
//! mapping a failure onto a transport response is the boundary's job.

use saasify_core::error::{DenialReason, SaasifyError, SaasifyResult};
use saasify_core::models::membership::TenantRole;
use saasify_core::models::tenant::Tenant;
use saasify_core::models::tenant_context::TenantContext;
use saasify_core::models::user::User;
use saasify_core::repository::{MembershipRepository, TenantRepository, UserRepository};
use tracing::warn;
use uuid::Uuid;

use crate::identity::{IdentityAdapter, IdentityProvider};
use crate::resolver::TenantContextResolver;

/// Request-scoped inputs to the guards, extracted by the boundary.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Identity-provider session token, if the caller sent one.
    pub session_token: Option<String>,
    /// Raw tenant-selection cookie value.
    pub tenant_selection: Option<String>,
}

/// Proof that the caller is signed in and has a local user record.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

/// Proof that the caller is an active member of an active tenant.
#[derive(Debug, Clone)]
pub struct TenantMembership {
    pub user: User,
    pub tenant_id: Uuid,
    pub tenant: Tenant,
    pub role: TenantRole,
    pub ctx: TenantContext,
}

impl TenantMembership {
    pub fn is_admin(&self) -> bool {
        self.role == TenantRole::TenantAdmin
    }
}

/// Composes identity, tenant resolution and role checks.
#[derive(Clone)]
pub struct AccessGuard<P, U, T, M>
where
    P: IdentityProvider,
    U: UserRepository,
    T: TenantRepository,
    M: MembershipRepository,
{
    provider: P,
    identities: IdentityAdapter<U>,
    resolver: TenantContextResolver<T, M>,
}

impl<P, U, T, M> AccessGuard<P, U, T, M>
where
    P: IdentityProvider,
    U: UserRepository,
    T: TenantRepository,
    M: MembershipRepository,
{
    pub fn new(
        provider: P,
        identities: IdentityAdapter<U>,
        resolver: TenantContextResolver<T, M>,
    ) -> Self {
        Self {
            provider,
            identities,
            resolver,
        }
    }

    pub fn resolver(&self) -> &TenantContextResolver<T, M> {
        &self.resolver
    }

    pub fn identities(&self) -> &IdentityAdapter<U> {
        &self.identities
    }

    /// Fails with `Unauthenticated` unless the request carries a verified
    /// identity. The local user record is created or refreshed on success.
    pub async fn require_auth(&self, creds: &RequestCredentials) -> SaasifyResult<AuthenticatedUser> {
        let identity = self
            .provider
            .current_identity(creds.session_token.as_deref())
            .await?
            .ok_or(SaasifyError::Unauthenticated)?;
        let user = self.identities.ensure_local_user(identity).await?;
        Ok(AuthenticatedUser { user })
    }

    pub async fn require_platform_admin(
        &self,
        creds: &RequestCredentials,
    ) -> SaasifyResult<AuthenticatedUser> {
        let auth = self.require_auth(creds).await?;
        if !auth.user.is_platform_admin() {
            return Err(deny(auth.user.id, DenialReason::PlatformAdminOnly, None));
        }
        Ok(auth)
    }

    pub async fn require_tenant_membership(
        &self,
        creds: &RequestCredentials,
    ) -> SaasifyResult<TenantMembership> {
        let AuthenticatedUser { user } = self.require_auth(creds).await?;
        let ctx = self
            .resolver
            .resolve(creds.tenant_selection.as_deref(), Some(user.id))
            .await?;

        if !ctx.ok {
            return Err(deny(
                user.id,
                DenialReason::TenantContext(ctx.status),
                ctx.redirect_to.clone(),
            ));
        }

        let (Some(role), Some(tenant)) = (ctx.role, ctx.tenant.clone()) else {
            return Err(deny(
                user.id,
                DenialReason::MembershipRequired,
                ctx.redirect_to.clone(),
            ));
        };

        Ok(TenantMembership {
            user,
            tenant_id: tenant.id,
            tenant,
            role,
            ctx,
        })
    }

    pub async fn require_tenant_role(
        &self,
        creds: &RequestCredentials,
        minimum: TenantRole,
    ) -> SaasifyResult<TenantMembership> {
        let membership = self.require_tenant_membership(creds).await?;
        if !membership.role.satisfies(minimum) {
            return Err(deny(membership.user.id, DenialReason::RoleInsufficient, None));
        }
        Ok(membership)
    }

    pub async fn require_tenant_admin(
        &self,
        creds: &RequestCredentials,
    ) -> SaasifyResult<TenantMembership> {
        self.require_tenant_role(creds, TenantRole::TenantAdmin).await
    }
}

/// Checks a tenant id taken from a request path against the tenant the
/// guard resolved.
///
/// A malformed id is a validation failure. A well-formed id naming any
/// other tenant is a `TENANT_MISMATCH` denial, even when the caller also
/// belongs to that tenant.
pub fn ensure_tenant_id_matches_param(param: &str, scoped_tenant_id: Uuid) -> SaasifyResult<Uuid> {
    let requested = Uuid::parse_str(param.trim())
        .map_err(|_| SaasifyError::invalid_field("tenantId", "Invalid tenant id"))?;
    if requested != scoped_tenant_id {
        warn!(
            %requested,
            selected = %scoped_tenant_id,
            reason = %DenialReason::TenantMismatch,
            "Access denied"
        );
        return Err(SaasifyError::denied(DenialReason::TenantMismatch));
    }
    Ok(requested)
}

fn deny(user_id: Uuid, reason: DenialReason, redirect_to: Option<String>) -> SaasifyError {
    warn!(%user_id, %reason, "Access denied");
    SaasifyError::AccessDenied {
        reason,
        redirect_to,
    }
}
