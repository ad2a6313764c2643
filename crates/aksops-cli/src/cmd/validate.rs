use crate::output::print_json;
use aksops_core::config::Config;
use aksops_core::manifest::{self, CheckLevel, ValidationReport};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, path: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let report = manifest::validate_path(&config, path)
        .with_context(|| format!("failed to validate {}", path.display()))?;

    if json {
        print_json(&report)?;
    } else {
        render(&report);
    }

    if report.has_failures() {
        anyhow::bail!("validation failed: {} failing check(s)", report.failed);
    }
    Ok(())
}

fn render(report: &ValidationReport) {
    for file in &report.files {
        println!("{}", file.path.display());
        for r in &file.results {
            let marker = match r.level {
                CheckLevel::Pass => "ok  ",
                CheckLevel::Warn => "warn",
                CheckLevel::Fail => "FAIL",
            };
            println!("  {marker}  {}: {}", r.check, r.message);
        }
    }
    let total = report.passed + report.warned + report.failed;
    println!();
    println!(
        "{} checks: {} passed, {} warnings, {} failures",
        total, report.passed, report.warned, report.failed
    );
}
