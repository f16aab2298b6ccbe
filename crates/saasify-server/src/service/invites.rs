//! Tenant invites.
//!
//! The raw token is returned once at creation; only its SHA-256 hash is
//! stored.

use chrono::{Duration, Utc};
use saasify_auth::token::{generate_invite_token, hash_invite_token};
use saasify_core::error::{SaasifyError, SaasifyResult};
use saasify_core::models::invite::{CreateInvite, Invite, InviteStatus};
use saasify_core::models::membership::{Membership, TenantRole};
use saasify_core::models::user::User;
use saasify_core::repository::{
    AuditLogRepository, InviteRepository, MembershipRepository, PaginatedResult, Pagination,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditTrail;
use super::validate::validate_input;

pub const INVITE_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteInput {
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    pub role: Option<TenantRole>,
}

impl InviteInput {
    /// Invite addresses are matched case-insensitively, so they are stored
    /// lowercased.
    fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInvite {
    pub invite: Invite,
    pub raw_token: String,
}

#[derive(Clone)]
pub struct InviteService<I, M, A>
where
    I: InviteRepository,
    M: MembershipRepository,
    A: AuditLogRepository,
{
    invites: I,
    memberships: M,
    audit: AuditTrail<A>,
}

impl<I, M, A> InviteService<I, M, A>
where
    I: InviteRepository,
    M: MembershipRepository,
    A: AuditLogRepository,
{
    pub fn new(invites: I, memberships: M, audit: AuditTrail<A>) -> Self {
        Self {
            invites,
            memberships,
            audit,
        }
    }

    /// Create a pending invite. New invitees default to `tenant_user`.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        input: InviteInput,
    ) -> SaasifyResult<CreatedInvite> {
        let input = input.normalized();
        validate_input(&input)?;

        let raw_token = generate_invite_token();
        let invite = self
            .invites
            .create(CreateInvite {
                tenant_id,
                email: input.email,
                role: input.role.unwrap_or(TenantRole::TenantUser),
                token_hash: hash_invite_token(&raw_token),
                invited_by: actor_id,
                expires_at: Utc::now() + Duration::days(INVITE_TTL_DAYS),
            })
            .await?;

        info!(%tenant_id, invite_id = %invite.id, "Invite created");
        self.audit
            .record(
                tenant_id,
                actor_id,
                "invite.created",
                Some(invite.id),
                Some(serde_json::json!({ "role": invite.role.as_str() })),
            )
            .await;
        Ok(CreatedInvite { invite, raw_token })
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<InviteStatus>,
        pagination: Pagination,
    ) -> SaasifyResult<PaginatedResult<Invite>> {
        self.invites.list(tenant_id, status, pagination).await
    }

    pub async fn revoke(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        invite_id: Uuid,
    ) -> SaasifyResult<Invite> {
        let invite = self.invites.revoke(tenant_id, invite_id).await?;
        info!(%tenant_id, %invite_id, "Invite revoked");
        self.audit
            .record(tenant_id, actor_id, "invite.revoked", Some(invite_id), None)
            .await;
        Ok(invite)
    }

    /// Accept an invite addressed to `user`.
    ///
    /// Unknown, expired, revoked and mis-addressed tokens all fail the same
    /// way, with `NotFound`. A caller who is already an active member gets
    /// `AlreadyExists` and keeps their current role; the invite stays
    /// pending.
    pub async fn accept(&self, user: &User, raw_token: &str) -> SaasifyResult<Membership> {
        let raw_token = raw_token.trim();
        if raw_token.is_empty() {
            return Err(SaasifyError::invalid_field("token", "Required"));
        }

        let invite = self
            .invites
            .find_pending_by_token_hash(&hash_invite_token(raw_token))
            .await?
            .filter(|invite| !invite.is_expired(Utc::now()))
            .filter(|invite| invite.email.eq_ignore_ascii_case(user.email.trim()))
            .ok_or_else(|| {
                debug!(user_id = %user.id, "Invite token not usable by caller");
                SaasifyError::not_found("invite", "token")
            })?;

        let membership = self.memberships.accept_invite(&invite, user.id).await?;

        info!(tenant_id = %invite.tenant_id, user_id = %user.id, "Invite accepted");
        self.audit
            .record(
                invite.tenant_id,
                user.id,
                "invite.accepted",
                Some(invite.id),
                None,
            )
            .await;
        Ok(membership)
    }
}
