use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use marquee_api::TargetDescriptor;

use crate::error::GalleryError;

/// Root configuration, parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MarqueeConfig {
    /// HTTP bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Upper bound for a single target round-trip (connect, count, find, ...).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Capacity for targets that do not set their own.
    #[serde(default = "default_capacity")]
    pub default_capacity: usize,

    /// Page size when the caller does not pass `limit`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Storage targets, in declaration order.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

fn default_bind_address() -> String {
    "0.0.0.0".into()
}
fn default_api_port() -> u16 {
    3000
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_capacity() -> usize {
    100
}
fn default_page_size() -> usize {
    10
}
fn default_max_page_size() -> usize {
    100
}

/// One `[[targets]]` entry.
///
/// The connection string comes from exactly one of `uri`, `uri_env`
/// (environment variable name) or `uri_file` (secret file, e.g.
/// `/run/secrets/primary_uri`).
#[derive(Clone, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub uri_env: Option<String>,
    #[serde(default)]
    pub uri_file: Option<String>,
    #[serde(default)]
    pub capacity: Option<usize>,
    /// Lower = preferred. Defaults to the declaration index.
    #[serde(default)]
    pub priority: Option<usize>,
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("name", &self.name)
            .field("uri", &self.uri.as_ref().map(|_| "***"))
            .field("uri_env", &self.uri_env)
            .field("uri_file", &self.uri_file)
            .field("capacity", &self.capacity)
            .field("priority", &self.priority)
            .finish()
    }
}

impl TargetConfig {
    /// Resolve the connection string from whichever source is configured.
    pub fn resolve_uri(&self) -> Result<String, GalleryError> {
        let ctx = format!("target '{}'", self.name);
        let uri = match (&self.uri, &self.uri_env, &self.uri_file) {
            (Some(uri), None, None) => uri.clone(),
            (None, Some(var), None) => std::env::var(var).map_err(|e| {
                GalleryError::Config(format!("{ctx}: environment variable {var}: {e}"))
            })?,
            (None, None, Some(path)) => std::fs::read_to_string(path)
                .map(|s| s.trim().to_string())
                .map_err(|e| GalleryError::Config(format!("{ctx}: secret file {path}: {e}")))?,
            (None, None, None) => {
                return Err(GalleryError::Config(format!(
                    "{ctx}: one of uri, uri_env, uri_file is required"
                )));
            }
            _ => {
                return Err(GalleryError::Config(format!(
                    "{ctx}: uri, uri_env and uri_file are mutually exclusive"
                )));
            }
        };
        if uri.trim().is_empty() {
            return Err(GalleryError::Config(format!("{ctx}: empty uri")));
        }
        Ok(uri)
    }
}

impl MarqueeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, GalleryError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GalleryError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, GalleryError> {
        toml::from_str(toml_str).map_err(|e| GalleryError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Check everything that does not require touching a target.
    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.targets.is_empty() {
            return Err(GalleryError::Config("no [[targets]] configured".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(GalleryError::Config("request_timeout_ms must be positive".into()));
        }
        if self.page_size == 0 || self.page_size > self.max_page_size {
            return Err(GalleryError::Config(format!(
                "page_size must be in 1..={}",
                self.max_page_size
            )));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(GalleryError::Config("target with empty name".into()));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(GalleryError::Config(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
            if target.capacity.unwrap_or(self.default_capacity) == 0 {
                tracing::warn!(target_name = %target.name, "target has capacity 0, every write to it will overwrite");
            }
        }
        Ok(())
    }

    /// Validate and resolve targets into descriptors ordered by priority.
    /// Equal priorities keep declaration order.
    pub fn resolve_targets(&self) -> Result<Vec<TargetDescriptor>, GalleryError> {
        self.validate()?;
        let mut resolved: Vec<TargetDescriptor> = Vec::with_capacity(self.targets.len());
        for (index, target) in self.targets.iter().enumerate() {
            let uri = target.resolve_uri()?;
            // two targets on one store would each count the other's records
            if let Some(other) = resolved.iter().find(|t| t.uri == uri) {
                return Err(GalleryError::Config(format!(
                    "targets '{}' and '{}' resolve to the same uri",
                    other.name, target.name
                )));
            }
            resolved.push(TargetDescriptor::new(
                target.name.clone(),
                uri,
                target.capacity.unwrap_or(self.default_capacity),
                target.priority.unwrap_or(index),
            ));
        }
        resolved.sort_by_key(|t| t.priority);
        Ok(resolved)
    }
}
