pub mod credentials;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::errors::WikiError;

pub use credentials::{CredentialSource, EnvCredentials, StoreCredentials, VcapServices};

/// Which store backs the wiki
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

/// Application configuration, read from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub template_dir: PathBuf,
    /// Tag stamped on every rendered page
    pub instance: String,
    pub backend: StoreBackend,
    pub redis_service: String,
    pub vcap_services: Option<String>,
    pub redis_host: Option<String>,
    pub redis_port: Option<String>,
    pub redis_password: Option<String>,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            template_dir: PathBuf::from("templates"),
            instance: String::new(),
            backend: StoreBackend::Redis,
            redis_service: "my-redis".to_string(),
            vcap_services: None,
            redis_host: None,
            redis_port: None,
            redis_password: None,
        }
    }

    pub fn from_env() -> Result<Self, WikiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WikiError> {
        let mut config = Self::new();
        if let Some(host) = lookup("WIKIPAD_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| WikiError::Config(format!("invalid PORT {:?}", port)))?;
        }
        if let Some(dir) = lookup("WIKIPAD_TEMPLATE_DIR") {
            config.template_dir = PathBuf::from(dir);
        }
        config.instance = lookup("CF_INSTANCE_INDEX").unwrap_or_default();
        config.backend = match lookup("WIKIPAD_STORE").as_deref() {
            None | Some("redis") => StoreBackend::Redis,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(WikiError::Config(format!("unknown WIKIPAD_STORE {:?}", other)));
            }
        };
        if let Some(service) = lookup("WIKIPAD_REDIS_SERVICE") {
            config.redis_service = service;
        }
        config.vcap_services = lookup("VCAP_SERVICES");
        config.redis_host = lookup("WIKIPAD_REDIS_HOST");
        config.redis_port = lookup("WIKIPAD_REDIS_PORT");
        config.redis_password = lookup("WIKIPAD_REDIS_PASSWORD");
        Ok(config)
    }

    /// Resolve store credentials, preferring `VCAP_SERVICES`
    pub fn store_credentials(&self) -> Result<StoreCredentials, WikiError> {
        let vcap = VcapServices::new(self.vcap_services.clone(), self.redis_service.clone());
        let env = EnvCredentials {
            host: self.redis_host.clone(),
            port: self.redis_port.clone(),
            password: self.redis_password.clone(),
        };
        let sources: [&dyn CredentialSource; 2] = [&vcap, &env];
        credentials::resolve_first(&sources)
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, WikiError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| WikiError::Config(format!("invalid WIKIPAD_HOST {:?}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, WikiError> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.socket_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.instance, "");
        assert_eq!(config.backend, StoreBackend::Redis);
        assert_eq!(config.template_dir, PathBuf::from("templates"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = from_pairs(&[
            ("PORT", "9090"),
            ("WIKIPAD_HOST", "127.0.0.1"),
            ("CF_INSTANCE_INDEX", "4"),
            ("WIKIPAD_STORE", "memory"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.instance, "4");
        assert_eq!(config.backend, StoreBackend::Memory);
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(from_pairs(&[("PORT", "eighty")]), Err(WikiError::Config(_))));
        assert!(matches!(from_pairs(&[("WIKIPAD_STORE", "sqlite")]), Err(WikiError::Config(_))));
    }

    #[test]
    fn credentials_prefer_vcap_over_plain_env() {
        let vcap = r#"{"redis": [{"name": "pages", "credentials": {"hostname": "vcap-host", "port": "6390"}}]}"#;
        let config = from_pairs(&[
            ("VCAP_SERVICES", vcap),
            ("WIKIPAD_REDIS_SERVICE", "pages"),
            ("WIKIPAD_REDIS_HOST", "env-host"),
        ])
        .unwrap();
        let creds = config.store_credentials().unwrap();
        assert_eq!((creds.host.as_str(), creds.port), ("vcap-host", 6390));
    }
}
