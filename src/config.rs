//! Configuration management for PromptEdge
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PromptEdgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for PromptEdge
///
/// This structure holds all configuration needed by the edge proxy and
/// the authenticated client: edge routing settings, identity settings,
/// client settings, and informational deployment outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Edge routing and proxy configuration
    #[serde(default)]
    pub edge: EdgeConfig,

    /// Identity provider configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Client configuration for talking to the edge/backend
    #[serde(default)]
    pub client: ClientConfig,

    /// Deployment-time outputs (informational, not runtime contracts)
    #[serde(default)]
    pub outputs: DeploymentOutputs,
}

/// Edge routing configuration
///
/// Controls where the edge proxy listens, which path prefix is routed to
/// the dynamic origin, and how static content is served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Address the edge proxy binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path prefix routed to the dynamic origin (e.g. "/api/")
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Directory holding pre-built static assets
    #[serde(default = "default_static_root")]
    pub static_root: PathBuf,

    /// Index document served for unmatched static paths (SPA fallback)
    #[serde(default = "default_index_document")]
    pub index_document: String,

    /// Dynamic origin base URL
    ///
    /// When unset, the origin address is derived from
    /// `outputs.load_balancer_dns` if present.
    #[serde(default)]
    pub dynamic_origin: Option<Url>,

    /// Cache lifetime in seconds applied to static-origin responses
    #[serde(default = "default_static_max_age")]
    pub static_max_age_secs: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_api_prefix() -> String {
    "/api/".to_string()
}

fn default_static_root() -> PathBuf {
    PathBuf::from("site")
}

fn default_index_document() -> String {
    "index.html".to_string()
}

fn default_static_max_age() -> u64 {
    86400
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            api_prefix: default_api_prefix(),
            static_root: default_static_root(),
            index_document: default_index_document(),
            dynamic_origin: None,
            static_max_age_secs: default_static_max_age(),
        }
    }
}

/// Identity provider configuration
///
/// The identity provider itself is an external collaborator; this section
/// only carries the contract anchors the application needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Issuer URL the dynamic origin validates bearer tokens against
    #[serde(default)]
    pub issuer: Option<Url>,

    /// Environment variable the CLI token provider reads the session token from
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,
}

fn default_token_env_var() -> String {
    "PROMPTEDGE_TOKEN".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            issuer: None,
            token_env_var: default_token_env_var(),
        }
    }
}

/// Client configuration
///
/// Settings for the CLI client commands (`prompt`, `history`), which talk
/// to the edge (or directly to the dynamic origin) over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL requests are issued against
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> Url {
    // A literal URL cannot fail to parse.
    Url::parse("http://127.0.0.1:8080").expect("valid literal URL")
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Deployment-time stack outputs
///
/// Informational identifiers emitted by the provisioning layer. They are
/// never required at runtime, with one exception: `load_balancer_dns` can
/// stand in for `edge.dynamic_origin` when the latter is unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentOutputs {
    /// DNS name of the load balancer in front of the dynamic origin
    #[serde(default)]
    pub load_balancer_dns: Option<String>,

    /// Bucket holding the static content
    #[serde(default)]
    pub frontend_bucket_name: Option<String>,

    /// Distribution identifier
    #[serde(default)]
    pub distribution_id: Option<String>,

    /// Distribution domain name
    #[serde(default)]
    pub distribution_domain_name: Option<String>,

    /// Identity provider user pool identifier
    #[serde(default)]
    pub user_pool_id: Option<String>,

    /// Identity provider user pool client identifier
    #[serde(default)]
    pub user_pool_client_id: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            edge: EdgeConfig::default(),
            identity: IdentityConfig::default(),
            client: ClientConfig::default(),
            outputs: DeploymentOutputs::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PromptEdgeError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PromptEdgeError::Config(format!("Failed to parse config: {}", e)).into())
    }

    /// Apply environment variable overrides
    fn apply_env_vars(&mut self) {
        if let Ok(listen_addr) = std::env::var("PROMPTEDGE_LISTEN_ADDR") {
            self.edge.listen_addr = listen_addr.clone();
            tracing::debug!(listen_addr = %listen_addr, "Env override: PROMPTEDGE_LISTEN_ADDR");
        }

        if let Ok(api_prefix) = std::env::var("PROMPTEDGE_API_PREFIX") {
            self.edge.api_prefix = api_prefix.clone();
            tracing::debug!(api_prefix = %api_prefix, "Env override: PROMPTEDGE_API_PREFIX");
        }

        if let Ok(static_root) = std::env::var("PROMPTEDGE_STATIC_ROOT") {
            self.edge.static_root = PathBuf::from(static_root.clone());
            tracing::debug!(static_root = %static_root, "Env override: PROMPTEDGE_STATIC_ROOT");
        }

        if let Ok(origin) = std::env::var("PROMPTEDGE_DYNAMIC_ORIGIN") {
            match Url::parse(&origin) {
                Ok(url) => {
                    self.edge.dynamic_origin = Some(url);
                    tracing::debug!(origin = %origin, "Env override: PROMPTEDGE_DYNAMIC_ORIGIN");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for PROMPTEDGE_DYNAMIC_ORIGIN: {}", origin);
                }
            }
        }

        if let Ok(base_url) = std::env::var("PROMPTEDGE_BASE_URL") {
            match Url::parse(&base_url) {
                Ok(url) => {
                    self.client.base_url = url;
                    tracing::debug!(base_url = %base_url, "Env override: PROMPTEDGE_BASE_URL");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for PROMPTEDGE_BASE_URL: {}", base_url);
                }
            }
        }

        if let Ok(timeout) = std::env::var("PROMPTEDGE_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => {
                    self.client.timeout_seconds = v;
                    tracing::debug!(timeout_seconds = v, "Env override: PROMPTEDGE_TIMEOUT_SECONDS");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for PROMPTEDGE_TIMEOUT_SECONDS: {}", timeout);
                }
            }
        }
    }

    /// Apply CLI argument overrides
    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            self.client.base_url = base_url.clone();
            tracing::debug!(base_url = %base_url, "CLI override: --base-url");
        }
    }

    /// Resolve the dynamic origin base URL
    ///
    /// Prefers the explicit `edge.dynamic_origin` setting and falls back to
    /// deriving an address from `outputs.load_balancer_dns`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::Config`] when neither source is available.
    pub fn dynamic_origin_url(&self) -> Result<Url> {
        if let Some(url) = &self.edge.dynamic_origin {
            return Ok(url.clone());
        }

        if let Some(dns) = &self.outputs.load_balancer_dns {
            return Url::parse(&format!("http://{}", dns)).map_err(|e| {
                PromptEdgeError::Config(format!("Invalid load balancer DNS name: {}", e)).into()
            });
        }

        Err(PromptEdgeError::Config(
            "No dynamic origin configured: set edge.dynamic_origin or outputs.load_balancer_dns"
                .to_string(),
        )
        .into())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`PromptEdgeError::Config`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if !self.edge.api_prefix.starts_with('/') {
            return Err(
                PromptEdgeError::Config("api_prefix must start with '/'".to_string()).into(),
            );
        }

        if self.edge.api_prefix == "/" {
            return Err(PromptEdgeError::Config(
                "api_prefix must not be '/': it would shadow the static default".to_string(),
            )
            .into());
        }

        if self.edge.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(PromptEdgeError::Config(format!(
                "listen_addr is not a valid socket address: {}",
                self.edge.listen_addr
            ))
            .into());
        }

        if self.edge.index_document.is_empty() {
            return Err(
                PromptEdgeError::Config("index_document cannot be empty".to_string()).into(),
            );
        }

        if self.edge.static_max_age_secs == 0 {
            return Err(PromptEdgeError::Config(
                "static_max_age_secs must be greater than 0".to_string(),
            )
            .into());
        }

        if self.client.timeout_seconds == 0 {
            return Err(PromptEdgeError::Config(
                "timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_edge_defaults() {
        let edge = EdgeConfig::default();
        assert_eq!(edge.listen_addr, "127.0.0.1:8080");
        assert_eq!(edge.api_prefix, "/api/");
        assert_eq!(edge.index_document, "index.html");
        assert_eq!(edge.static_max_age_secs, 86400);
        assert!(edge.dynamic_origin.is_none());
    }

    #[test]
    fn test_load_reads_file_and_fills_defaults() {
        let dir = crate::test_utils::temp_dir();
        let path = crate::test_utils::create_test_file(
            &dir,
            "config.yaml",
            "edge:\n  api_prefix: /backend/\n",
        );

        let cli = crate::cli::Cli::default();
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.edge.api_prefix, "/backend/");
        assert_eq!(config.edge.index_document, "index.html");
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let dir = crate::test_utils::temp_dir();
        let path = dir.path().join("nope.yaml");

        let cli = crate::cli::Cli::default();
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.edge.api_prefix, "/api/");
    }

    #[test]
    fn test_cli_base_url_overrides_config() {
        let mut cli = crate::cli::Cli::default();
        cli.base_url = Some(Url::parse("http://edge.example.com").unwrap());

        let dir = crate::test_utils::temp_dir();
        let path = dir.path().join("nope.yaml");
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.client.base_url.as_str(), "http://edge.example.com/");
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = "edge:\n  api_prefix: /backend/\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.edge.api_prefix, "/backend/");
        // Unspecified sections fall back to defaults.
        assert_eq!(config.client.timeout_seconds, 30);
        assert_eq!(config.identity.token_env_var, "PROMPTEDGE_TOKEN");
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
edge:
  listen_addr: "0.0.0.0:9000"
  api_prefix: /api/
  static_root: /var/www/site
  index_document: app.html
  dynamic_origin: "http://backend.internal:8080"
  static_max_age_secs: 3600
identity:
  issuer: "https://idp.example.com/pool-1"
  token_env_var: MY_TOKEN
client:
  base_url: "https://edge.example.com"
  timeout_seconds: 10
outputs:
  load_balancer_dns: lb.example.com
  frontend_bucket_name: site-bucket
  distribution_id: DIST123
  distribution_domain_name: d123.example.net
  user_pool_id: pool-1
  user_pool_client_id: client-1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.edge.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.edge.index_document, "app.html");
        assert_eq!(
            config.edge.dynamic_origin.as_ref().unwrap().as_str(),
            "http://backend.internal:8080/"
        );
        assert_eq!(config.identity.token_env_var, "MY_TOKEN");
        assert_eq!(config.client.timeout_seconds, 10);
        assert_eq!(
            config.outputs.distribution_id,
            Some("DIST123".to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_api_prefix() {
        let mut config = Config::default();
        config.edge.api_prefix = "api/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_root_api_prefix() {
        let mut config = Config::default();
        config.edge.api_prefix = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_listen_addr() {
        let mut config = Config::default();
        config.edge.listen_addr = "not-an-addr".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.client.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_static_max_age() {
        let mut config = Config::default();
        config.edge.static_max_age_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dynamic_origin_url_prefers_explicit_setting() {
        let mut config = Config::default();
        config.edge.dynamic_origin = Some(Url::parse("http://origin:8080").unwrap());
        config.outputs.load_balancer_dns = Some("lb.example.com".to_string());

        let url = config.dynamic_origin_url().unwrap();
        assert_eq!(url.as_str(), "http://origin:8080/");
    }

    #[test]
    fn test_dynamic_origin_url_falls_back_to_outputs() {
        let mut config = Config::default();
        config.outputs.load_balancer_dns = Some("lb.example.com".to_string());

        let url = config.dynamic_origin_url().unwrap();
        assert_eq!(url.as_str(), "http://lb.example.com/");
    }

    #[test]
    fn test_dynamic_origin_url_errors_when_unset() {
        let config = Config::default();
        assert!(config.dynamic_origin_url().is_err());
    }

    #[test]
    fn test_outputs_roundtrip_through_yaml() {
        let outputs = DeploymentOutputs {
            load_balancer_dns: Some("lb.example.com".to_string()),
            frontend_bucket_name: Some("bucket".to_string()),
            distribution_id: None,
            distribution_domain_name: None,
            user_pool_id: Some("pool".to_string()),
            user_pool_client_id: Some("client".to_string()),
        };

        let yaml = serde_yaml::to_string(&outputs).unwrap();
        let restored: DeploymentOutputs = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored.load_balancer_dns, outputs.load_balancer_dns);
        assert_eq!(restored.user_pool_client_id, outputs.user_pool_client_id);
    }
}
