//! Server configuration (environment-driven).

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use inmoadmin_core::TenantId;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// JSON seed file with one catalog per tenant.
    pub seed_path: Option<PathBuf>,
    /// Tenant that receives the built-in demo catalog when no seed file is given.
    pub demo_tenant: Option<TenantId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ServerConfig {
    /// Read `INMOADMIN_BIND`, `JWT_SECRET`, `INMOADMIN_SEED` and
    /// `INMOADMIN_SEED_TENANT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup("INMOADMIN_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind.trim().parse().map_err(|e| ConfigError::Invalid {
            key: "INMOADMIN_BIND",
            reason: format!("{e}"),
        })?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let seed_path = lookup("INMOADMIN_SEED")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let demo_tenant = match lookup("INMOADMIN_SEED_TENANT") {
            Some(raw) => Some(raw.trim().parse::<TenantId>().map_err(|e| ConfigError::Invalid {
                key: "INMOADMIN_SEED_TENANT",
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            seed_path,
            demo_tenant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        ServerConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults() {
        let config = from(&[]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.seed_path, None);
        assert_eq!(config.demo_tenant, None);
    }

    #[test]
    fn explicit_values() {
        let tenant = TenantId::new();
        let tenant_str = tenant.to_string();
        let config = from(&[
            ("INMOADMIN_BIND", "127.0.0.1:9000"),
            ("JWT_SECRET", "prod-secret"),
            ("INMOADMIN_SEED", "/etc/inmoadmin/seed.json"),
            ("INMOADMIN_SEED_TENANT", tenant_str.as_str()),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt_secret, "prod-secret");
        assert_eq!(config.seed_path, Some(PathBuf::from("/etc/inmoadmin/seed.json")));
        assert_eq!(config.demo_tenant, Some(tenant));
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = from(&[("INMOADMIN_BIND", "nowhere")]).unwrap_err();
        assert!(err.to_string().contains("INMOADMIN_BIND"));

        let err = from(&[("INMOADMIN_SEED_TENANT", "abc")]).unwrap_err();
        assert!(err.to_string().contains("INMOADMIN_SEED_TENANT"));
    }
}
