use aksops_core::{config::Config, io, paths};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing aksops in: {}", root.display());

    for dir in [paths::AKSOPS_DIR, paths::DECOMMISSIONS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_yaml =
        serde_yaml::to_string(&Config::default()).context("failed to render default config")?;
    let written = io::write_if_missing(&paths::config_path(root), config_yaml.as_bytes())
        .context("failed to write config.yaml")?;
    if written {
        println!("  created: {}", paths::CONFIG_FILE);
        println!();
        println!(
            "Edit {} to match your cluster (registry host,",
            paths::CONFIG_FILE
        );
        println!("shared gateway, DNS zone) before deploying.");
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    Ok(())
}
