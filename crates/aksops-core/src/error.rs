use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("not initialized: run 'aksops init'")]
    NotInitialized,

    #[error("invalid app name '{0}': must be a lowercase DNS label (max 63 chars)")]
    InvalidAppName(String),

    #[error("required tool not found on PATH: {0}")]
    ToolNotFound(String),

    #[error("{program} failed: {detail}")]
    CommandFailed { program: String, detail: String },

    #[error("no YAML manifests found at {0}")]
    NoManifests(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, OpsError>;
