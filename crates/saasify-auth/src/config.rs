//! Authentication and tenant-selection configuration.

pub const DEFAULT_SELECT_TENANT_PATH: &str = "/tenant/select-tenant";
pub const DEFAULT_SELECTION_COOKIE: &str = "saasify_tenant";

/// Configuration for identity verification and tenant selection.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 public key of the identity provider, used to
    /// verify session tokens.
    pub idp_public_key_pem: String,
    /// Expected `iss` claim of session tokens.
    pub idp_issuer: String,
    /// Expected `aud` claim, if the provider sets one.
    pub idp_audience: Option<String>,
    /// `whsec_`-prefixed signing secret for provider webhooks.
    /// `None` rejects every webhook.
    pub webhook_secret: Option<String>,
    /// Maximum webhook timestamp skew in seconds (default: 300).
    pub webhook_tolerance_secs: i64,
    /// Where callers go to pick a tenant.
    pub select_tenant_path: String,
    /// Name of the tenant-selection cookie.
    pub selection_cookie_name: String,
    /// Selection cookie lifetime in seconds (default: 2_592_000 = 30 days).
    pub selection_cookie_max_age_secs: u64,
    /// Mark the selection cookie `Secure` (production only).
    pub secure_cookies: bool,
}

impl AuthConfig {
    /// The configured select-tenant path, falling back to the default
    /// unless it is an absolute path.
    pub fn safe_select_path(&self) -> &str {
        let path = self.select_tenant_path.trim();
        if path.starts_with('/') {
            path
        } else {
            DEFAULT_SELECT_TENANT_PATH
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            idp_public_key_pem: String::new(),
            idp_issuer: "saasify-idp".into(),
            idp_audience: None,
            webhook_secret: None,
            webhook_tolerance_secs: 300,
            select_tenant_path: DEFAULT_SELECT_TENANT_PATH.into(),
            selection_cookie_name: DEFAULT_SELECTION_COOKIE.into(),
            selection_cookie_max_age_secs: 2_592_000,
            secure_cookies: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_select_path_falls_back_to_default() {
        let config = AuthConfig {
            select_tenant_path: "https://evil.example.com".into(),
            ..Default::default()
        };
        assert_eq!(config.safe_select_path(), DEFAULT_SELECT_TENANT_PATH);

        let config = AuthConfig {
            select_tenant_path: " /workspaces ".into(),
            ..Default::default()
        };
        assert_eq!(config.safe_select_path(), "/workspaces");
    }
}
