use crate::error::{OpsError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const AKSOPS_DIR: &str = ".aksops";
pub const DECOMMISSIONS_DIR: &str = ".aksops/decommissions";

pub const CONFIG_FILE: &str = ".aksops/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn aksops_dir(root: &Path) -> PathBuf {
    root.join(AKSOPS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn decommissions_dir(root: &Path) -> PathBuf {
    root.join(DECOMMISSIONS_DIR)
}

// ---------------------------------------------------------------------------
// App name validation
// ---------------------------------------------------------------------------

static APP_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn app_name_re() -> &'static Regex {
    APP_NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// App names become namespaces, DNS records, and ACR repository names, so
/// they must be valid DNS-1123 labels: lowercase alphanumeric with hyphens,
/// at most 63 characters.
pub fn validate_app_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 63 || !app_name_re().is_match(name) {
        return Err(OpsError::InvalidAppName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
