use crate::error::{OpsError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ClusterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_cluster_name")]
    pub name: String,
    /// Expected kubectl context. A mismatch at deploy time is a warning,
    /// not an error: the operator may be deploying from a jump host with a
    /// differently named context.
    #[serde(default = "default_cluster_name")]
    pub context: String,
    #[serde(default = "default_resource_group")]
    pub resource_group: String,
}

fn default_cluster_name() -> String {
    "aks-prod".to_string()
}

fn default_resource_group() -> String {
    "rg-aks-prod".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: default_cluster_name(),
            context: default_cluster_name(),
            resource_group: default_resource_group(),
        }
    }
}

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Approved image prefix, e.g. "example.azurecr.io". Manifests pulling
    /// from anywhere else fail validation.
    #[serde(default = "default_registry_host")]
    pub host: String,
    /// ACR resource name, used by `az acr repository delete`.
    #[serde(default = "default_registry_name")]
    pub name: String,
}

fn default_registry_host() -> String {
    "example.azurecr.io".to_string()
}

fn default_registry_name() -> String {
    "example".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: default_registry_host(),
            name: default_registry_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_dns_zone")]
    pub dns_zone: String,
    #[serde(default = "default_dns_resource_group")]
    pub dns_resource_group: String,
    /// Approved shared ingress gateway as "namespace/name". VirtualServices
    /// routing through any other gateway fail validation.
    #[serde(default = "default_gateway")]
    pub gateway: String,
}

fn default_dns_zone() -> String {
    "apps.example.com".to_string()
}

fn default_dns_resource_group() -> String {
    "rg-dns".to_string()
}

fn default_gateway() -> String {
    "aks-istio-ingress/shared-gateway".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            dns_zone: default_dns_zone(),
            dns_resource_group: default_dns_resource_group(),
            gateway: default_gateway(),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyVaultConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyVaultConfig {
    /// Vault name = prefix + app name.
    #[serde(default = "default_vault_prefix")]
    pub prefix: String,
}

fn default_vault_prefix() -> String {
    "kv-".to_string()
}

impl Default for KeyVaultConfig {
    fn default() -> Self {
        Self {
            prefix: default_vault_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// DeployConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Helm chart path relative to the project root.
    #[serde(default = "default_chart")]
    pub chart: String,
    #[serde(default = "default_rollout_timeout")]
    pub rollout_timeout_seconds: u64,
}

fn default_chart() -> String {
    "deploy/chart".to_string()
}

fn default_rollout_timeout() -> u64 {
    300
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            chart: default_chart(),
            rollout_timeout_seconds: default_rollout_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub key_vault: KeyVaultConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            cluster: ClusterConfig::default(),
            registry: RegistryConfig::default(),
            network: NetworkConfig::default(),
            key_vault: KeyVaultConfig::default(),
            deploy: DeployConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(OpsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Key Vault name for an app, per the cluster's naming convention.
    pub fn vault_name(&self, app: &str) -> String {
        format!("{}{}", self.key_vault.prefix, app)
    }

    /// Public URL an app was served from before decommissioning.
    pub fn app_url(&self, app: &str) -> String {
        format!("https://{}.{}", app, self.network.dns_zone)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.registry.host.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "registry.host is empty — the registry check cannot run".to_string(),
            });
        } else if self.registry.host.contains('/') || self.registry.host.contains("://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "registry.host '{}' should be a bare hostname (e.g. example.azurecr.io)",
                    self.registry.host
                ),
            });
        }

        if self.registry.name.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "registry.name is empty — decommission cannot delete image repositories"
                    .to_string(),
            });
        }

        if !self.network.gateway.contains('/') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "network.gateway '{}' should be 'namespace/name'",
                    self.network.gateway
                ),
            });
        }

        if self.cluster.context.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "cluster.context is empty — deploy context checks are disabled"
                    .to_string(),
            });
        }

        if self.deploy.rollout_timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "deploy.rollout_timeout_seconds is 0 — rollout waits will return immediately"
                    .to_string(),
            });
        }

        // Azure vault names are capped at 24 characters.
        if self.key_vault.prefix.len() > 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "key_vault.prefix '{}' leaves little room for app names (vault names max 24 chars)",
                    self.key_vault.prefix
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
