use std::process::Stdio;

use anyhow::Result;
use async_trait::async_trait;
use ollama_task_core::api::{
    DockerRunnerConfig, RunnerError, RunnerSession, RunnerStartArgs, TaskRunner, VolumeMount,
};
use tokio::process::Command;

use super::session::ChildSession;

/// Container path the run's working directory is bound to.
pub const WORKSPACE: &str = "/workspace";

/// Runs the script in a throwaway container through the docker CLI.
#[derive(Debug, Clone)]
pub struct DockerTaskRunner {
    docker_bin: String,
    image: String,
    volumes: Vec<VolumeMount>,
    network: Option<String>,
    pull_policy: Option<String>,
    user: Option<String>,
}

impl DockerTaskRunner {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            docker_bin: "docker".to_string(),
            image: image.into(),
            volumes: Vec::new(),
            network: None,
            pull_policy: None,
            user: None,
        }
    }

    pub fn from_config(cfg: &DockerRunnerConfig) -> Result<Self, RunnerError> {
        let volumes = cfg
            .volumes
            .iter()
            .map(|v| VolumeMount::parse(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            docker_bin: cfg.docker_bin.clone(),
            image: cfg.image.clone(),
            volumes,
            network: cfg.network.clone(),
            pull_policy: cfg.pull_policy.clone(),
            user: cfg.user.clone(),
        })
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Arguments after the docker binary, e.g. `run --rm -v ... image /bin/sh -c <script>`.
    ///
    /// Env values are not placed on the command line; `-e KEY` makes docker read them
    /// from the client's own environment.
    pub fn build_run_args(&self, args: &RunnerStartArgs) -> Vec<String> {
        let mut out: Vec<String> = vec!["run".to_string(), "--rm".to_string()];
        if let Some(policy) = &self.pull_policy {
            out.push("--pull".to_string());
            out.push(policy.clone());
        }
        if let Some(net) = &self.network {
            out.push("--network".to_string());
            out.push(net.clone());
        }
        if let Some(user) = &self.user {
            out.push("--user".to_string());
            out.push(user.clone());
        }
        // mounts
        for v in &self.volumes {
            push_mount(&mut out, &v.to_string());
        }
        push_mount(
            &mut out,
            &format!("{}:{}", args.working_dir.display(), WORKSPACE),
        );
        out.push("-w".to_string());
        out.push(WORKSPACE.to_string());

        let mut keys: Vec<&String> = args.envs.keys().collect();
        keys.sort();
        for k in keys {
            out.push("-e".to_string());
            out.push(k.clone());
        }

        let image = args
            .container_image
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.image);
        // ollama/ollama's entrypoint is the ollama binary; the interpreter replaces it.
        out.push("--entrypoint".to_string());
        out.push(String::new());
        out.push(image.to_string());
        out.extend(args.interpreter.iter().cloned());
        out.push(args.script.clone());
        out
    }
}

fn push_mount(args: &mut Vec<String>, spec: &str) {
    args.push("-v".to_string());
    args.push(spec.to_string());
}

#[async_trait]
impl TaskRunner for DockerTaskRunner {
    fn name(&self) -> &str {
        "docker"
    }

    fn supports_volume_mounts(&self) -> bool {
        true
    }

    fn volumes(&self) -> &[VolumeMount] {
        &self.volumes
    }

    fn with_volumes(&self, volumes: Vec<VolumeMount>) -> Option<Box<dyn TaskRunner>> {
        Some(Box::new(Self {
            volumes,
            ..self.clone()
        }))
    }

    fn box_clone(&self) -> Box<dyn TaskRunner> {
        Box::new(self.clone())
    }

    async fn start_session(&self, args: &RunnerStartArgs) -> Result<Box<dyn RunnerSession>> {
        if !args.working_dir.is_absolute() {
            anyhow::bail!(
                "working directory {} must be absolute to be bind-mounted",
                args.working_dir.display()
            );
        }
        let run_args = self.build_run_args(args);
        tracing::debug!("{} {}", self.docker_bin, run_args.join(" "));

        let child = Command::new(&self.docker_bin)
            .args(&run_args)
            .envs(&args.envs)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("failed to start '{}': {}", self.docker_bin, e))?;

        Ok(Box::new(ChildSession::new(child)))
    }
}
