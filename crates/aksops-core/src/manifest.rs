//! Textual manifest checks against the cluster's deployment conventions.
//!
//! Checks are line-oriented heuristics, not schema validation: they catch
//! the common "forgot the security context" class of mistake cheaply, and
//! false positives/negatives are acceptable. The one exception is the
//! syntax check, which parses each document with serde_yaml so validation
//! works without cluster access.

use crate::config::Config;
use crate::error::{OpsError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// CheckLevel / CheckResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckLevel {
    Pass,
    Warn,
    Fail,
}

impl CheckLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckLevel::Pass => "pass",
            CheckLevel::Warn => "warn",
            CheckLevel::Fail => "fail",
        }
    }
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub check: &'static str,
    pub level: CheckLevel,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub results: Vec<CheckResult>,
}

impl FileReport {
    fn push(&mut self, check: &'static str, level: CheckLevel, message: impl Into<String>) {
        self.results.push(CheckResult {
            check,
            level,
            message: message.into(),
        });
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub files: Vec<FileReport>,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl ValidationReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    fn tally(&mut self) {
        self.passed = 0;
        self.warned = 0;
        self.failed = 0;
        for file in &self.files {
            for r in &file.results {
                match r.level {
                    CheckLevel::Pass => self.passed += 1,
                    CheckLevel::Warn => self.warned += 1,
                    CheckLevel::Fail => self.failed += 1,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate a single file or every `*.yaml`/`*.yml` under a directory.
pub fn validate_path(config: &Config, path: &Path) -> Result<ValidationReport> {
    let files = collect_manifests(path)?;
    let mut report = ValidationReport::default();
    for file in files {
        report.files.push(validate_file(config, &file)?);
    }
    report.tally();
    Ok(report)
}

pub fn validate_file(config: &Config, path: &Path) -> Result<FileReport> {
    let content = std::fs::read_to_string(path)?;
    let mut report = FileReport {
        path: path.to_path_buf(),
        results: Vec::new(),
    };

    check_syntax(&content, &mut report);
    check_registry(config, &content, &mut report);
    if has_kind(&content, "Deployment") {
        check_security_context(&content, &mut report);
        check_resource_limits(&content, &mut report);
        check_probes(&content, &mut report);
        check_sidecar_injection(&content, &mut report);
    }
    if has_kind(&content, "VirtualService") {
        check_gateway(config, &content, &mut report);
    }
    check_secret_literals(&content, &mut report);

    Ok(report)
}

fn collect_manifests(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(OpsError::NoManifests(path.display().to_string()));
    }
    let mut files = Vec::new();
    walk_yaml(path, &mut files)?;
    if files.is_empty() {
        return Err(OpsError::NoManifests(path.display().to_string()));
    }
    Ok(files)
}

fn walk_yaml(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            walk_yaml(&path, out)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        ) {
            out.push(path);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn has_kind(content: &str, kind: &str) -> bool {
    content
        .lines()
        .any(|l| l.trim() == format!("kind: {kind}"))
}

fn check_syntax(content: &str, report: &mut FileReport) {
    for (i, doc) in serde_yaml::Deserializer::from_str(content).enumerate() {
        if let Err(e) = serde_yaml::Value::deserialize(doc) {
            report.push(
                "syntax",
                CheckLevel::Fail,
                format!("document {} is not valid YAML: {e}", i + 1),
            );
            return;
        }
    }
    report.push("syntax", CheckLevel::Pass, "parses as YAML");
}

static IMAGE_RE: OnceLock<Regex> = OnceLock::new();

fn image_re() -> &'static Regex {
    IMAGE_RE.get_or_init(|| Regex::new(r#"^\s*(?:-\s+)?image:\s*["']?([^\s"']+)"#).unwrap())
}

fn check_registry(config: &Config, content: &str, report: &mut FileReport) {
    let prefix = format!("{}/", config.registry.host);
    let mut offending = Vec::new();
    let mut seen_concrete = false;
    for line in content.lines() {
        let Some(caps) = image_re().captures(line) else {
            continue;
        };
        let image = &caps[1];
        // Helm-templated references are resolved at install time; skip them.
        if image.contains("{{") {
            continue;
        }
        seen_concrete = true;
        if !image.starts_with(&prefix) {
            offending.push(image.to_string());
        }
    }
    if !seen_concrete {
        return;
    }
    if offending.is_empty() {
        report.push(
            "registry",
            CheckLevel::Pass,
            format!("all images pulled from {}", config.registry.host),
        );
    } else {
        report.push(
            "registry",
            CheckLevel::Fail,
            format!(
                "image(s) not from approved registry {}: {}",
                config.registry.host,
                offending.join(", ")
            ),
        );
    }
}

static NON_ROOT_RE: OnceLock<Regex> = OnceLock::new();

fn non_root_re() -> &'static Regex {
    NON_ROOT_RE.get_or_init(|| Regex::new(r"(?m)^\s*runAsNonRoot:\s*true\s*$").unwrap())
}

fn check_security_context(content: &str, report: &mut FileReport) {
    if non_root_re().is_match(content) {
        report.push("security-context", CheckLevel::Pass, "runs as non-root");
    } else {
        report.push(
            "security-context",
            CheckLevel::Fail,
            "missing 'runAsNonRoot: true' in securityContext",
        );
    }
}

fn check_resource_limits(content: &str, report: &mut FileReport) {
    let has_resources = content.lines().any(|l| l.trim() == "resources:");
    let has_limits = content.lines().any(|l| l.trim() == "limits:");
    if has_resources && has_limits {
        report.push("resource-limits", CheckLevel::Pass, "resource limits set");
    } else {
        report.push(
            "resource-limits",
            CheckLevel::Fail,
            "missing resources.limits block",
        );
    }
}

fn check_probes(content: &str, report: &mut FileReport) {
    let mut missing = Vec::new();
    for probe in ["livenessProbe", "readinessProbe"] {
        if !content.contains(&format!("{probe}:")) {
            missing.push(probe);
        }
    }
    if missing.is_empty() {
        report.push("probes", CheckLevel::Pass, "liveness and readiness probes set");
    } else {
        report.push(
            "probes",
            CheckLevel::Warn,
            format!("missing {}", missing.join(" and ")),
        );
    }
}

static SIDECAR_ON_RE: OnceLock<Regex> = OnceLock::new();

fn sidecar_on_re() -> &'static Regex {
    SIDECAR_ON_RE
        .get_or_init(|| Regex::new(r#"sidecar\.istio\.io/inject["']?\s*:\s*["']?true"#).unwrap())
}

fn check_sidecar_injection(content: &str, report: &mut FileReport) {
    if sidecar_on_re().is_match(content) {
        report.push("sidecar-injection", CheckLevel::Pass, "sidecar injection enabled");
    } else if content.contains("sidecar.istio.io/inject") {
        report.push(
            "sidecar-injection",
            CheckLevel::Warn,
            "sidecar injection explicitly disabled",
        );
    } else {
        report.push(
            "sidecar-injection",
            CheckLevel::Warn,
            "missing sidecar.istio.io/inject annotation",
        );
    }
}

fn check_gateway(config: &Config, content: &str, report: &mut FileReport) {
    let approved = &config.network.gateway;
    if content.contains(approved.as_str()) {
        report.push(
            "gateway",
            CheckLevel::Pass,
            format!("routes through {approved}"),
        );
    } else if content.contains("gateways:") {
        report.push(
            "gateway",
            CheckLevel::Fail,
            format!("does not reference the approved shared gateway {approved}"),
        );
    } else {
        report.push(
            "gateway",
            CheckLevel::Warn,
            "no gateways listed (mesh-only route)",
        );
    }
}

static SECRET_KEY_RE: OnceLock<Regex> = OnceLock::new();

fn secret_key_re() -> &'static Regex {
    SECRET_KEY_RE.get_or_init(|| {
        Regex::new(
            r#"(?i)^\s*(?:-\s+)?"?[a-z0-9_.\-]*(?:password|passwd|secret|token|api[-_]?key|access[-_]?key|connection[-_]?string)[a-z0-9_.\-]*"?\s*:\s*(.+)$"#,
        )
        .unwrap()
    })
}

static SECRET_VALUE_RE: OnceLock<Regex> = OnceLock::new();

fn secret_value_re() -> &'static Regex {
    SECRET_VALUE_RE.get_or_init(|| Regex::new(r#"^["']?[A-Za-z0-9+/=_.:@\-]{8,}["']?$"#).unwrap())
}

/// Keys that contain a secret-ish word but are references, not literals.
const SECRET_REF_MARKERS: &[&str] = &[
    "secretKeyRef",
    "secretRef",
    "secretName",
    "secretProviderClass",
    "secretObjects",
    "valueFrom",
];

fn check_secret_literals(content: &str, report: &mut FileReport) {
    let mut hits = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if SECRET_REF_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }
        let Some(caps) = secret_key_re().captures(line) else {
            continue;
        };
        let value = caps[1].trim();
        if value.contains("{{") {
            continue;
        }
        if secret_value_re().is_match(value) {
            hits.push(i + 1);
        }
    }
    if has_kind(content, "Secret") && content.lines().any(|l| l.trim() == "stringData:") {
        report.push(
            "secret-literals",
            CheckLevel::Fail,
            "Secret manifest embeds stringData; mount secrets via SecretProviderClass instead",
        );
        return;
    }
    if hits.is_empty() {
        report.push(
            "secret-literals",
            CheckLevel::Pass,
            "no hardcoded secret patterns",
        );
    } else {
        report.push(
            "secret-literals",
            CheckLevel::Fail,
            format!(
                "possible hardcoded secret on line(s) {}",
                hits.iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GOOD_DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: shop-api
  labels:
    app: shop-api
spec:
  replicas: 2
  template:
    metadata:
      annotations:
        sidecar.istio.io/inject: "true"
    spec:
      securityContext:
        runAsNonRoot: true
      containers:
        - name: shop-api
          image: example.azurecr.io/shop-api:1.4.2
          resources:
            limits:
              cpu: 500m
              memory: 256Mi
          livenessProbe:
            httpGet:
              path: /healthz
              port: 8080
          readinessProbe:
            httpGet:
              path: /readyz
              port: 8080
          env:
            - name: DB_PASSWORD
              valueFrom:
                secretKeyRef:
                  name: shop-api-secrets
                  key: db-password
"#;

    fn validate_str(content: &str) -> FileReport {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.yaml");
        std::fs::write(&path, content).unwrap();
        validate_file(&Config::default(), &path).unwrap()
    }

    fn level_of(report: &FileReport, check: &str) -> Option<CheckLevel> {
        report
            .results
            .iter()
            .find(|r| r.check == check)
            .map(|r| r.level)
    }

    #[test]
    fn compliant_deployment_passes_everything() {
        let report = validate_str(GOOD_DEPLOYMENT);
        assert!(
            report.results.iter().all(|r| r.level == CheckLevel::Pass),
            "unexpected non-pass: {:?}",
            report.results
        );
    }

    #[test]
    fn missing_run_as_non_root_fails() {
        let content = GOOD_DEPLOYMENT.replace("        runAsNonRoot: true\n", "");
        let report = validate_str(&content);
        assert_eq!(level_of(&report, "security-context"), Some(CheckLevel::Fail));
    }

    #[test]
    fn foreign_registry_fails() {
        let content = GOOD_DEPLOYMENT.replace(
            "example.azurecr.io/shop-api:1.4.2",
            "docker.io/library/nginx:latest",
        );
        let report = validate_str(&content);
        assert_eq!(level_of(&report, "registry"), Some(CheckLevel::Fail));
        let msg = &report
            .results
            .iter()
            .find(|r| r.check == "registry")
            .unwrap()
            .message;
        assert!(msg.contains("docker.io/library/nginx:latest"));
    }

    #[test]
    fn templated_image_is_skipped() {
        let content =
            GOOD_DEPLOYMENT.replace("example.azurecr.io/shop-api:1.4.2", "\"{{ .Values.image }}\"");
        let report = validate_str(&content);
        assert_eq!(level_of(&report, "registry"), None);
    }

    #[test]
    fn missing_probes_warns() {
        let content = GOOD_DEPLOYMENT
            .replace("          livenessProbe:\n            httpGet:\n              path: /healthz\n              port: 8080\n", "");
        let report = validate_str(&content);
        assert_eq!(level_of(&report, "probes"), Some(CheckLevel::Warn));
        let msg = &report
            .results
            .iter()
            .find(|r| r.check == "probes")
            .unwrap()
            .message;
        assert!(msg.contains("livenessProbe"));
    }

    #[test]
    fn missing_limits_fails() {
        let content = GOOD_DEPLOYMENT.replace(
            "          resources:\n            limits:\n              cpu: 500m\n              memory: 256Mi\n",
            "",
        );
        let report = validate_str(&content);
        assert_eq!(level_of(&report, "resource-limits"), Some(CheckLevel::Fail));
    }

    #[test]
    fn sidecar_disabled_warns() {
        let content = GOOD_DEPLOYMENT.replace(
            r#"sidecar.istio.io/inject: "true""#,
            r#"sidecar.istio.io/inject: "false""#,
        );
        let report = validate_str(&content);
        assert_eq!(level_of(&report, "sidecar-injection"), Some(CheckLevel::Warn));
    }

    #[test]
    fn hardcoded_password_fails() {
        let content = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app-config\ndata:\n  db_password: hunter2hunter2\n";
        let report = validate_str(content);
        assert_eq!(level_of(&report, "secret-literals"), Some(CheckLevel::Fail));
        let msg = &report
            .results
            .iter()
            .find(|r| r.check == "secret-literals")
            .unwrap()
            .message;
        assert!(msg.contains("line(s) 6"));
    }

    #[test]
    fn secret_reference_is_not_flagged() {
        let report = validate_str(GOOD_DEPLOYMENT);
        assert_eq!(level_of(&report, "secret-literals"), Some(CheckLevel::Pass));
    }

    #[test]
    fn string_data_in_secret_fails() {
        let content = "apiVersion: v1\nkind: Secret\nmetadata:\n  name: creds\nstringData:\n  user: admin\n";
        let report = validate_str(content);
        assert_eq!(level_of(&report, "secret-literals"), Some(CheckLevel::Fail));
    }

    #[test]
    fn virtualservice_with_approved_gateway_passes() {
        let content = "apiVersion: networking.istio.io/v1beta1\nkind: VirtualService\nmetadata:\n  name: shop-api\nspec:\n  hosts:\n    - shop-api.apps.example.com\n  gateways:\n    - aks-istio-ingress/shared-gateway\n";
        let report = validate_str(content);
        assert_eq!(level_of(&report, "gateway"), Some(CheckLevel::Pass));
    }

    #[test]
    fn virtualservice_with_foreign_gateway_fails() {
        let content = "apiVersion: networking.istio.io/v1beta1\nkind: VirtualService\nmetadata:\n  name: shop-api\nspec:\n  gateways:\n    - team-x/private-gateway\n";
        let report = validate_str(content);
        assert_eq!(level_of(&report, "gateway"), Some(CheckLevel::Fail));
    }

    #[test]
    fn virtualservice_without_gateways_warns() {
        let content = "apiVersion: networking.istio.io/v1beta1\nkind: VirtualService\nmetadata:\n  name: internal\nspec:\n  hosts:\n    - internal.default.svc.cluster.local\n";
        let report = validate_str(content);
        assert_eq!(level_of(&report, "gateway"), Some(CheckLevel::Warn));
    }

    #[test]
    fn invalid_yaml_fails_syntax() {
        let content = "kind: Deployment\n  bad indentation: [unclosed\n";
        let report = validate_str(content);
        assert_eq!(level_of(&report, "syntax"), Some(CheckLevel::Fail));
    }

    #[test]
    fn values_file_gets_only_generic_checks() {
        let content = "image:\n  repository: example.azurecr.io/shop-api\n  tag: latest\nreplicas: 2\n";
        let report = validate_str(content);
        let checks: Vec<&str> = report.results.iter().map(|r| r.check).collect();
        assert!(!checks.contains(&"security-context"));
        assert!(!checks.contains(&"probes"));
        assert!(checks.contains(&"syntax"));
        assert!(checks.contains(&"secret-literals"));
    }

    #[test]
    fn validate_path_walks_directory_and_tallies() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.yaml"), GOOD_DEPLOYMENT).unwrap();
        std::fs::write(
            dir.path().join("sub/b.yml"),
            GOOD_DEPLOYMENT.replace("        runAsNonRoot: true\n", ""),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = validate_path(&Config::default(), dir.path()).unwrap();
        assert_eq!(report.files.len(), 2);
        assert!(report.has_failures());
        assert_eq!(report.failed, 1);
        assert!(report.passed > 0);
        // Sorted walk: a.yaml before sub/b.yml
        assert!(report.files[0].path.ends_with("a.yaml"));
    }

    #[test]
    fn validate_path_empty_dir_errors() {
        let dir = TempDir::new().unwrap();
        let result = validate_path(&Config::default(), dir.path());
        assert!(matches!(result, Err(OpsError::NoManifests(_))));
    }

    #[test]
    fn report_serializes_to_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.yaml"), GOOD_DEPLOYMENT).unwrap();
        let report = validate_path(&Config::default(), dir.path()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"passed\""));
        assert!(json.contains("\"security-context\""));
    }
}
