use aksops_core::config::Config;
use aksops_core::deploy::{self, DeployRequest};
use aksops_core::exec;
use anyhow::Context;
use std::path::Path;

pub fn run(
    root: &Path,
    app: &str,
    image_tag: Option<&str>,
    hostname: Option<&str>,
    namespace: Option<&str>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let req = DeployRequest::new(&config, app, image_tag, hostname, namespace, timeout)?;

    // Best-effort context check: a mismatch is a warning, an unreadable
    // context (no kubectl, no kubeconfig) is a hard failure.
    let context = deploy::current_context().context("could not read current kubectl context")?;
    if context != config.cluster.context {
        println!(
            "warning: kubectl context is '{context}', expected '{}' — deploying anyway",
            config.cluster.context
        );
    }

    println!(
        "Deploying {} (tag {}) to namespace {}",
        req.app, req.image_tag, req.namespace
    );

    let helm = deploy::helm_upgrade(&config, &req, root);
    tracing::debug!("running: {helm}");
    exec::run(&helm).context("helm upgrade failed")?;

    let rollout = deploy::rollout_status(&req);
    tracing::debug!("running: {rollout}");
    exec::run(&rollout).context("rollout did not complete")?;

    // Status print is informational; a failure here doesn't fail the deploy.
    if exec::run(&deploy::pod_status(&req)).is_err() {
        eprintln!("warning: could not list pods for {}", req.app);
    }

    println!("Deployed {} ({})", req.app, req.image_tag);
    Ok(())
}
