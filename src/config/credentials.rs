//! Resolution of key-value store credentials.
//!
//! Credentials are resolved once at startup from the first source that has
//! them: a Cloud Foundry style `VCAP_SERVICES` document, then plain
//! environment variables.

use std::collections::HashMap;

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::WikiError;

pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Where and how to reach the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

pub trait CredentialSource {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when this source has nothing to offer
    fn resolve(&self) -> Result<Option<StoreCredentials>, WikiError>;
}

#[derive(Deserialize)]
struct ServiceBinding {
    name: String,
    #[serde(default)]
    credentials: HashMap<String, Value>,
}

/// Credentials bound to a named service in a `VCAP_SERVICES` document
pub struct VcapServices {
    document: Option<String>,
    service: String,
}

impl VcapServices {
    pub fn new(document: Option<String>, service: impl Into<String>) -> Self {
        Self { document, service: service.into() }
    }
}

impl CredentialSource for VcapServices {
    fn name(&self) -> &'static str {
        "VCAP_SERVICES"
    }

    fn resolve(&self) -> Result<Option<StoreCredentials>, WikiError> {
        let Some(document) = self.document.as_deref() else {
            return Ok(None);
        };
        let services: HashMap<String, Vec<ServiceBinding>> = serde_json::from_str(document)
            .map_err(|e| WikiError::Config(format!("VCAP_SERVICES is not valid: {}", e)))?;
        let binding = services
            .into_values()
            .flatten()
            .find(|binding| binding.name == self.service)
            .ok_or_else(|| {
                WikiError::Config(format!("no service named {:?} in VCAP_SERVICES", self.service))
            })?;

        let host = credential_string(&binding.credentials, "hostname")
            .or_else(|| credential_string(&binding.credentials, "host"))
            .ok_or_else(|| {
                WikiError::Config(format!("service {:?} has no hostname", self.service))
            })?;
        let port = match credential_string(&binding.credentials, "port") {
            Some(port) => parse_port(&port)?,
            None => DEFAULT_REDIS_PORT,
        };
        let password = credential_string(&binding.credentials, "password").filter(|p| !p.is_empty());
        debug!("Found service {:?} in VCAP_SERVICES", self.service);
        Ok(Some(StoreCredentials { host, port, password }))
    }
}

/// Ports show up both as strings and as numbers in service bindings
fn credential_string(credentials: &HashMap<String, Value>, key: &str) -> Option<String> {
    match credentials.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_port(raw: &str) -> Result<u16, WikiError> {
    raw.trim()
        .parse()
        .map_err(|_| WikiError::Config(format!("invalid store port {:?}", raw)))
}

/// Credentials given directly through `WIKIPAD_REDIS_*` variables
pub struct EnvCredentials {
    pub host: Option<String>,
    pub port: Option<String>,
    pub password: Option<String>,
}

impl CredentialSource for EnvCredentials {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn resolve(&self) -> Result<Option<StoreCredentials>, WikiError> {
        let Some(host) = self.host.clone() else {
            return Ok(None);
        };
        let port = match self.port.as_deref() {
            Some(port) => parse_port(port)?,
            None => DEFAULT_REDIS_PORT,
        };
        Ok(Some(StoreCredentials { host, port, password: self.password.clone() }))
    }
}

/// Credentials from the first source that yields any
pub fn resolve_first(sources: &[&dyn CredentialSource]) -> Result<StoreCredentials, WikiError> {
    for source in sources {
        if let Some(credentials) = source.resolve()? {
            info!(
                "Using store at {}:{} from {}",
                credentials.host,
                credentials.port,
                source.name()
            );
            return Ok(credentials);
        }
    }
    Err(WikiError::Config(
        "no store credentials: set VCAP_SERVICES or WIKIPAD_REDIS_HOST".to_string(),
    ))
}
