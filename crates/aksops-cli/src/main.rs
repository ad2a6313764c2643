mod cmd;
mod output;
mod prompt;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "aksops",
    about = "Deployment operations for a shared AKS cluster — validate manifests, deploy releases, decommission apps",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .aksops/ or .git/)
    #[arg(long, global = true, env = "AKSOPS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold .aksops/ and the default cluster config
    Init,

    /// Check manifests against the cluster's deployment conventions
    Validate {
        /// A manifest file, or a directory searched recursively for YAML
        path: PathBuf,
    },

    /// Install or upgrade an application release and wait for rollout
    Deploy {
        /// App name (DNS label; also the default namespace)
        app: String,
        /// Image tag to deploy (default: latest)
        image_tag: Option<String>,
        /// Ingress hostname override (default: chart value)
        hostname: Option<String>,
        /// Target namespace (default: app name)
        #[arg(long)]
        namespace: Option<String>,
        /// Rollout timeout in seconds (default: from config)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Tear down an app's cluster and cloud resources
    Decommission {
        /// App name
        app: String,
        /// Print every command instead of executing anything
        #[arg(long)]
        dry_run: bool,
        /// Namespace the app lives in (default: app name)
        #[arg(long)]
        namespace: Option<String>,
        /// Reason recorded in the decommission record
        #[arg(long)]
        reason: Option<String>,
    },

    /// Inspect and validate the cluster config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Validate { path } => cmd::validate::run(&root, &path, cli.json),
        Commands::Deploy {
            app,
            image_tag,
            hostname,
            namespace,
            timeout,
        } => cmd::deploy::run(
            &root,
            &app,
            image_tag.as_deref(),
            hostname.as_deref(),
            namespace.as_deref(),
            timeout,
        ),
        Commands::Decommission {
            app,
            dry_run,
            namespace,
            reason,
        } => cmd::decommission::run(&root, &app, dry_run, namespace.as_deref(), reason),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
