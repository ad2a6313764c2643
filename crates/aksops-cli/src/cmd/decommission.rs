use crate::prompt;
use aksops_core::config::Config;
use aksops_core::decommission::{self, PhaseStatus};
use aksops_core::record::DecommissionRecord;
use anyhow::Context;
use std::path::Path;

pub fn run(
    root: &Path,
    app: &str,
    dry_run: bool,
    namespace: Option<&str>,
    reason: Option<String>,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let plan = decommission::plan(&config, app, namespace)?;

    if dry_run {
        println!(
            "Dry run — these commands would be executed for '{}':",
            plan.app
        );
        for phase in &plan.phases {
            println!();
            println!("# {} — {}", phase.name, phase.title);
            for cmd in &phase.commands {
                println!("{cmd}");
            }
        }
        return Ok(());
    }

    println!(
        "About to decommission '{}' from cluster '{}' (namespace {}).",
        plan.app, config.cluster.name, plan.namespace
    );
    println!(
        "This deletes Kubernetes resources, the '{}' Key Vault, the DNS record,",
        config.vault_name(&plan.app)
    );
    println!("and all container images for the app. There is no undo.");
    if !prompt::confirm("Type 'yes' to continue")? {
        anyhow::bail!("aborted — nothing was deleted");
    }

    let mut outcomes = Vec::new();
    for phase in &plan.phases {
        if !prompt::confirm(&format!("Delete {}?", phase.title))? {
            println!("  skipped {}", phase.name);
            outcomes.push(decommission::skipped(phase));
            continue;
        }
        for cmd in &phase.commands {
            tracing::debug!("running: {cmd}");
        }
        let outcome = decommission::run_phase(phase);
        match outcome.status {
            PhaseStatus::Done => println!("  done {}", phase.name),
            PhaseStatus::Failed => println!(
                "  failed {}: {}",
                phase.name,
                outcome.detail.as_deref().unwrap_or("unknown error")
            ),
            PhaseStatus::Skipped => unreachable!("run_phase never skips"),
        }
        outcomes.push(outcome);
    }

    let any_failed = outcomes.iter().any(|o| o.status == PhaseStatus::Failed);

    let record = DecommissionRecord::new(&config, &plan.app, reason, outcomes);
    let path = record.write(root).context("failed to write record")?;
    println!("Decommission record written to {}", path.display());

    if any_failed {
        anyhow::bail!("decommission finished with failures — see the record");
    }
    Ok(())
}
