//! Subprocess invocation for the wrapped CLIs (kubectl, az, helm).
//!
//! The cluster and cloud are consumed strictly through their command-line
//! contracts: arguments in, text and exit codes out. Binaries are resolved
//! from PATH at call time, so tests can substitute stubs.

use crate::error::{OpsError, Result};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

/// One external command, built before execution so dry-run mode can print
/// exactly what live mode would run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Resolve a tool binary from PATH.
pub fn require(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| OpsError::ToolNotFound(program.to_string()))
}

/// Run a command with inherited stdio. Errors on a non-zero exit.
pub fn run(spec: &CommandSpec) -> Result<()> {
    let bin = require(&spec.program)?;
    let status = Command::new(&bin)
        .args(&spec.args)
        .status()
        .map_err(|e| OpsError::CommandFailed {
            program: spec.program.clone(),
            detail: e.to_string(),
        })?;
    if !status.success() {
        return Err(OpsError::CommandFailed {
            program: spec.program.clone(),
            detail: format!("{status}"),
        });
    }
    Ok(())
}

/// Run a command and collect stdout. Errors on a non-zero exit, with the
/// trimmed stderr as the detail.
pub fn capture(spec: &CommandSpec) -> Result<String> {
    let bin = require(&spec.program)?;
    let output = Command::new(&bin)
        .args(&spec.args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| OpsError::CommandFailed {
            program: spec.program.clone(),
            detail: e.to_string(),
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OpsError::CommandFailed {
            program: spec.program.clone(),
            detail: stderr.trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_a_shell_style_line() {
        let spec = CommandSpec::new("kubectl", ["delete", "deployment", "shop-api", "-n", "shop"]);
        assert_eq!(
            spec.to_string(),
            "kubectl delete deployment shop-api -n shop"
        );
    }

    #[test]
    fn display_quotes_args_with_whitespace() {
        let spec = CommandSpec::new("az", ["keyvault", "delete", "--name", "kv with space"]);
        assert!(spec.to_string().ends_with("--name 'kv with space'"));
    }

    #[test]
    fn require_missing_tool_errors() {
        let result = require("definitely-not-a-real-binary-7f3a");
        assert!(matches!(result, Err(OpsError::ToolNotFound(_))));
    }

    #[test]
    fn run_missing_tool_names_the_binary() {
        let spec = CommandSpec::new("definitely-not-a-real-binary-7f3a", ["x"]);
        let err = run(&spec).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-binary-7f3a"));
    }
}
