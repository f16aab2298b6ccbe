//! Error types for the Saasify system.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::models::tenant_context::TenantContextStatus;

/// Field name -> list of human-readable problems with that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Why an access guard refused a request.
///
/// Each reason is distinct internally so that logs say exactly which check
/// failed. The HTTP boundary flattens all of them into one generic denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Caller is authenticated but lacks the `platform_admin` role.
    PlatformAdminOnly,
    /// Tenant resolution failed with the given status.
    TenantContext(TenantContextStatus),
    /// Tenant resolved but no role was attached to the context.
    MembershipRequired,
    /// Caller's tenant role ranks below the required minimum.
    RoleInsufficient,
    /// Path tenant id differs from the selected tenant.
    TenantMismatch,
}

impl DenialReason {
    /// Stable internal reason code (used for logging and tests).
    pub fn code(&self) -> String {
        match self {
            Self::PlatformAdminOnly => "FORBIDDEN_PLATFORM_ADMIN_ONLY".into(),
            Self::TenantContext(status) => {
                format!("FORBIDDEN_TENANT_CONTEXT_{}", status.as_str())
            }
            Self::MembershipRequired => "FORBIDDEN_TENANT_MEMBERSHIP_REQUIRED".into(),
            Self::RoleInsufficient => "FORBIDDEN_TENANT_ROLE_INSUFFICIENT".into(),
            Self::TenantMismatch => "TENANT_MISMATCH".into(),
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

#[derive(Debug, Error)]
pub enum SaasifyError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("UNAUTHENTICATED")]
    Unauthenticated,

    #[error("{reason}")]
    AccessDenied {
        reason: DenialReason,
        /// Where a UI boundary may send the caller to recover.
        redirect_to: Option<String>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SaasifyError {
    pub fn denied(reason: DenialReason) -> Self {
        Self::AccessDenied {
            reason,
            redirect_to: None,
        }
    }

    /// Validation failure with no per-field detail.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: FieldErrors::new(),
        }
    }

    /// Validation failure pinned to a single field.
    pub fn invalid_field(field: &str, problem: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), vec![problem.into()]);
        Self::Validation {
            message: "Invalid input".into(),
            field_errors,
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// The denial reason, when this is an authorization failure.
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::AccessDenied { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

pub type SaasifyResult<T> = Result<T, SaasifyError>;
