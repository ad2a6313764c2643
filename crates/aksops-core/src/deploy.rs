//! Helm install/upgrade orchestration for one application release.
//!
//! The chart itself lives in the repository; this module only assembles and
//! runs the helm/kubectl invocations. No rollback is attempted on failure.

use crate::config::Config;
use crate::error::Result;
use crate::exec::{self, CommandSpec};
use crate::paths;
use std::path::Path;

// ---------------------------------------------------------------------------
// DeployRequest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub app: String,
    pub image_tag: String,
    /// Ingress hostname override; the chart default applies when absent.
    pub hostname: Option<String>,
    pub namespace: String,
    pub timeout_seconds: u64,
}

impl DeployRequest {
    pub fn new(
        config: &Config,
        app: &str,
        image_tag: Option<&str>,
        hostname: Option<&str>,
        namespace: Option<&str>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self> {
        paths::validate_app_name(app)?;
        let namespace = namespace.unwrap_or(app).to_string();
        paths::validate_app_name(&namespace)?;
        Ok(Self {
            app: app.to_string(),
            image_tag: image_tag.unwrap_or("latest").to_string(),
            hostname: hostname.map(str::to_string),
            namespace,
            timeout_seconds: timeout_seconds.unwrap_or(config.deploy.rollout_timeout_seconds),
        })
    }
}

// ---------------------------------------------------------------------------
// Context check
// ---------------------------------------------------------------------------

/// The kubectl context currently selected on this machine.
pub fn current_context() -> Result<String> {
    let out = exec::capture(&CommandSpec::new("kubectl", ["config", "current-context"]))?;
    Ok(out.trim().to_string())
}

// ---------------------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------------------

pub fn helm_upgrade(config: &Config, req: &DeployRequest, root: &Path) -> CommandSpec {
    let chart = root.join(&config.deploy.chart);
    let mut args = vec![
        "upgrade".to_string(),
        "--install".to_string(),
        req.app.clone(),
        chart.display().to_string(),
        "--namespace".to_string(),
        req.namespace.clone(),
        "--create-namespace".to_string(),
        "--set".to_string(),
        format!("image.tag={}", req.image_tag),
    ];
    if let Some(host) = &req.hostname {
        args.push("--set".to_string());
        args.push(format!("ingress.host={host}"));
    }
    args.push("--timeout".to_string());
    args.push(format!("{}s", req.timeout_seconds));
    CommandSpec {
        program: "helm".to_string(),
        args,
    }
}

pub fn rollout_status(req: &DeployRequest) -> CommandSpec {
    CommandSpec::new(
        "kubectl",
        [
            "rollout".to_string(),
            "status".to_string(),
            format!("deployment/{}", req.app),
            "-n".to_string(),
            req.namespace.clone(),
            format!("--timeout={}s", req.timeout_seconds),
        ],
    )
}

pub fn pod_status(req: &DeployRequest) -> CommandSpec {
    CommandSpec::new(
        "kubectl",
        [
            "get".to_string(),
            "pods".to_string(),
            "-n".to_string(),
            req.namespace.clone(),
            "-l".to_string(),
            format!("app={}", req.app),
        ],
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
