//! Decommission records: the write-once markdown artifact left behind after
//! an app is torn down, kept under `.aksops/decommissions/`.

use crate::config::Config;
use crate::decommission::{PhaseOutcome, PhaseStatus};
use crate::error::Result;
use crate::{io, paths};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DecommissionRecord {
    pub app: String,
    pub date: DateTime<Utc>,
    pub reason: Option<String>,
    pub former_url: String,
    pub outcomes: Vec<PhaseOutcome>,
}

impl DecommissionRecord {
    pub fn new(
        config: &Config,
        app: &str,
        reason: Option<String>,
        outcomes: Vec<PhaseOutcome>,
    ) -> Self {
        Self {
            app: app.to_string(),
            date: Utc::now(),
            reason,
            former_url: config.app_url(app),
            outcomes,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("---\n");
        out.push_str(&format!("app: {}\n", self.app));
        out.push_str(&format!("date: {}\n", self.date.format("%Y-%m-%d")));
        out.push_str(&format!(
            "reason: {}\n",
            self.reason.as_deref().unwrap_or("not recorded")
        ));
        out.push_str(&format!("former_url: {}\n", self.former_url));
        out.push_str("---\n\n");
        out.push_str(&format!("# Decommission record: {}\n\n", self.app));
        out.push_str("## Cleanup checklist\n\n");
        for o in &self.outcomes {
            match o.status {
                PhaseStatus::Done => match &o.detail {
                    Some(detail) => {
                        out.push_str(&format!("- [x] {} ({detail})\n", o.title));
                    }
                    None => out.push_str(&format!("- [x] {}\n", o.title)),
                },
                PhaseStatus::Skipped => {
                    out.push_str(&format!("- [ ] {} — skipped\n", o.title));
                }
                PhaseStatus::Failed => {
                    let detail = o.detail.as_deref().unwrap_or("unknown error");
                    out.push_str(&format!("- [ ] {} — failed: {detail}\n", o.title));
                }
            }
        }
        out
    }

    pub fn file_name(&self) -> String {
        format!("{}-{}.md", self.date.format("%Y-%m-%d"), self.app)
    }

    pub fn write(&self, root: &Path) -> Result<PathBuf> {
        let dir = paths::decommissions_dir(root);
        io::ensure_dir(&dir)?;
        let path = dir.join(self.file_name());
        io::atomic_write(&path, self.render().as_bytes())?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outcome(name: &'static str, title: &'static str, status: PhaseStatus) -> PhaseOutcome {
        PhaseOutcome {
            name,
            title,
            status,
            detail: None,
        }
    }

    fn sample_record() -> DecommissionRecord {
        DecommissionRecord::new(
            &Config::default(),
            "shop-api",
            Some("replaced by shop-api-v2".to_string()),
            vec![
                outcome("kubernetes", "Kubernetes resources", PhaseStatus::Done),
                outcome("key-vault", "Azure Key Vault", PhaseStatus::Skipped),
                PhaseOutcome {
                    name: "dns",
                    title: "DNS record",
                    status: PhaseStatus::Failed,
                    detail: Some("az failed: zone not found".to_string()),
                },
                outcome("registry", "Container registry images", PhaseStatus::Done),
            ],
        )
    }

    #[test]
    fn render_has_frontmatter_fields() {
        let rendered = sample_record().render();
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.contains("app: shop-api\n"));
        assert!(rendered.contains("reason: replaced by shop-api-v2\n"));
        assert!(rendered.contains("former_url: https://shop-api.apps.example.com\n"));
    }

    #[test]
    fn render_marks_phase_outcomes() {
        let rendered = sample_record().render();
        assert!(rendered.contains("- [x] Kubernetes resources\n"));
        assert!(rendered.contains("- [ ] Azure Key Vault — skipped\n"));
        assert!(rendered.contains("- [ ] DNS record — failed: az failed: zone not found\n"));
    }

    #[test]
    fn missing_reason_is_explicit() {
        let record = DecommissionRecord::new(&Config::default(), "shop-api", None, vec![]);
        assert!(record.render().contains("reason: not recorded\n"));
    }

    #[test]
    fn write_creates_dated_file() {
        let dir = TempDir::new().unwrap();
        let record = sample_record();
        let path = record.write(dir.path()).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-shop-api.md"));
        assert!(path.starts_with(dir.path().join(".aksops/decommissions")));
    }
}
