//! Tenant-selection cookie.
//!
//! Setting the cookie only steers which tenant the resolver tries; it
//! grants nothing by itself.

use saasify_core::error::{SaasifyError, SaasifyResult};
use uuid::Uuid;

use crate::config::AuthConfig;

/// Validate a requested tenant id before it is written to the cookie.
pub fn parse_tenant_selection(raw: &str) -> SaasifyResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| SaasifyError::invalid_field("tenantId", "Invalid tenant id"))
}

/// `Set-Cookie` value selecting `tenant_id` for the whole application.
pub fn selection_cookie(config: &AuthConfig, tenant_id: Uuid) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax; HttpOnly",
        config.selection_cookie_name, tenant_id, config.selection_cookie_max_age_secs
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pull the selection cookie out of a `Cookie` request header.
pub fn read_selection<'a>(config: &AuthConfig, cookie_header: &'a str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == config.selection_cookie_name)
        .map(|(_, value)| value.trim())
}
