//! Shell command execution.
//!
//! `!ops <name> [args...]` runs the program configured under `<name>` with
//! the remaining arguments. Output is captured by the runtime, not the
//! calling task, and the child is killed once the timeout elapses.

use super::{Outcome, Trigger, TriggerResult, parse_options};
use crate::config::defaults::default_command_timeout;
use crate::error::{BindError, TriggerError};
use crate::protocol::{Request, Response};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DRIVER: &str = "gogap-commands";

#[derive(Debug, Clone, Deserialize)]
struct CommandSpec {
    cmd: String,
    #[serde(default)]
    cwd: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CommandsOptions {
    #[serde(default)]
    commands: HashMap<String, CommandSpec>,
    #[serde(default)]
    cwd: Option<PathBuf>,
    #[serde(default = "default_command_timeout")]
    timeout: u64,
}

/// Runs named, pre-configured programs.
pub struct Commands {
    commands: HashMap<String, CommandSpec>,
    default_cwd: PathBuf,
    timeout: Duration,
}

impl Commands {
    pub fn build(_word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: CommandsOptions = parse_options(DRIVER, options)?;
        let default_cwd = match opts.cwd {
            Some(cwd) => cwd,
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        Ok(Arc::new(Self {
            commands: opts.commands,
            default_cwd,
            timeout: Duration::from_secs(opts.timeout),
        }))
    }
}

#[async_trait]
impl Trigger for Commands {
    async fn handle(&self, req: &Request, resp: &mut Response) -> TriggerResult {
        let args = req.args();
        let (name, rest) = args.split_first().ok_or(TriggerError::MissingCommand)?;

        let spec = self
            .commands
            .get(*name)
            .ok_or_else(|| TriggerError::UnknownCommand(name.to_string()))?;
        let cwd = spec.cwd.as_deref().unwrap_or(&self.default_cwd);

        info!(user = %req.user_name, command = %name, "Executing command");
        resp.text = execute(&spec.cmd, rest, cwd, self.timeout).await?;
        Ok(Outcome::Continue)
    }
}

/// Run `program` with `args` in `cwd`, returning stdout.
///
/// Non-empty stderr is treated as failure.
pub async fn execute(
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<String, TriggerError> {
    let child = tokio::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    // Dropping the pending future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(program = %program, timeout = ?timeout, "Command timed out, killed");
            return Err(TriggerError::Timeout(timeout));
        }
    };

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        return Err(TriggerError::CommandFailed(stderr.into_owned()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
