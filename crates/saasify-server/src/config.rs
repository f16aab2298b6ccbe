//! Server configuration sourced from environment variables.

use std::fs;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use saasify_auth::config::{AuthConfig, DEFAULT_SELECT_TENANT_PATH};
use saasify_db::DbConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db: DbConfig,
    pub auth: AuthConfig,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = var("SAASIFY_BIND")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse SAASIFY_BIND")?;

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: var("SAASIFY_DB_URL").unwrap_or(db_defaults.url),
            namespace: var("SAASIFY_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: var("SAASIFY_DB_DATABASE").unwrap_or(db_defaults.database),
            username: var("SAASIFY_DB_USERNAME"),
            password: var("SAASIFY_DB_PASSWORD"),
        };

        let idp_public_key_pem = match var("SAASIFY_IDP_PUBLIC_KEY_PEM") {
            Some(pem) => pem,
            None => {
                let path = var("SAASIFY_IDP_PUBLIC_KEY_PATH").with_context(
                    || "set SAASIFY_IDP_PUBLIC_KEY_PEM or SAASIFY_IDP_PUBLIC_KEY_PATH",
                )?;
                fs::read_to_string(&path)
                    .with_context(|| format!("read SAASIFY_IDP_PUBLIC_KEY_PATH: {path}"))?
            }
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            idp_public_key_pem,
            idp_issuer: var("SAASIFY_IDP_ISSUER").unwrap_or(auth_defaults.idp_issuer),
            idp_audience: var("SAASIFY_IDP_AUDIENCE"),
            webhook_secret: var("SAASIFY_WEBHOOK_SECRET"),
            select_tenant_path: var("SAASIFY_SELECT_TENANT_PATH")
                .unwrap_or_else(|| DEFAULT_SELECT_TENANT_PATH.to_string()),
            secure_cookies: var("SAASIFY_ENV").is_some_and(|env| env == "production"),
            ..auth_defaults
        };

        Ok(Self {
            bind_addr,
            db,
            auth,
        })
    }
}
