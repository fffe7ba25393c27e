use std::process::Stdio;

use anyhow::Result;
use async_trait::async_trait;
use ollama_task_core::api::{ProcessRunnerConfig, RunnerSession, RunnerStartArgs, TaskRunner};
use tokio::process::Command;

use super::session::ChildSession;

/// Runs the script with the host's interpreter. Has no notion of volumes.
///
/// On unix the script leads its own process group, which is terminated when the script exits.
#[derive(Debug, Clone)]
pub struct ProcessTaskRunner {
    inherit_env: bool,
}

impl ProcessTaskRunner {
    pub fn new() -> Self {
        Self::from_config(&ProcessRunnerConfig::default())
    }

    pub fn from_config(cfg: &ProcessRunnerConfig) -> Self {
        Self {
            inherit_env: cfg.inherit_env,
        }
    }
}

impl Default for ProcessTaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRunner for ProcessTaskRunner {
    fn name(&self) -> &str {
        "process"
    }

    fn box_clone(&self) -> Box<dyn TaskRunner> {
        Box::new(self.clone())
    }

    async fn start_session(&self, args: &RunnerStartArgs) -> Result<Box<dyn RunnerSession>> {
        let (program, rest) = args
            .interpreter
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("empty interpreter"))?;

        let mut cmd = Command::new(program);
        cmd.args(rest).arg(&args.script).current_dir(&args.working_dir);
        if !self.inherit_env {
            cmd.env_clear();
            if let Some(path) = std::env::var_os("PATH") {
                cmd.env("PATH", path);
            }
        }
        // Own group, so a server the script backgrounds can be stopped with the script.
        #[cfg(unix)]
        cmd.process_group(0);
        let child = cmd
            .envs(&args.envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("failed to start '{}': {}", program, e))?;

        tracing::debug!("process runner started '{}' in {}", program, args.working_dir.display());
        Ok(Box::new(ChildSession::group_leader(child)))
    }
}
