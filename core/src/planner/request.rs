use std::collections::{BTreeSet, HashMap};

use crate::config::TaskSpec;
use crate::runner::TaskRunner;

use super::caching::{configure_caching, CacheConfig};
use super::commands::rewrite_commands;
use super::environment::resolve_environment;
use super::BOOTSTRAP_COMMAND;

/// Everything the command executor needs for one run.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub commands: Vec<String>,
    /// Run before `commands`, in the same shell.
    pub before_commands: Option<Vec<String>>,
    pub env: HashMap<String, String>,
    pub runner: Box<dyn TaskRunner>,
    pub output_files: BTreeSet<String>,
    pub interpreter: Vec<String>,
    pub container_image: String,
}

impl ExecutionRequest {
    /// Before-commands followed by commands.
    pub fn script_lines(&self) -> impl Iterator<Item = &str> {
        self.before_commands
            .iter()
            .flatten()
            .chain(self.commands.iter())
            .map(String::as_str)
    }

    pub fn script(&self) -> String {
        self.script_lines().collect::<Vec<_>>().join("\n")
    }

    /// Serializable view for dry runs and run-start logging. Env values are left out.
    pub fn summary(&self) -> serde_json::Value {
        let mut env_keys: Vec<&String> = self.env.keys().collect();
        env_keys.sort();
        serde_json::json!({
            "runner": self.runner.name(),
            "volumes": self.runner.volumes().iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            "container_image": self.container_image,
            "interpreter": self.interpreter,
            "before_commands": self.before_commands,
            "commands": self.commands,
            "env_keys": env_keys,
            "output_files": self.output_files,
        })
    }
}

/// Plans one run: environment, cache mount, command rewrite and local server bootstrap.
pub fn build_execution_request(spec: &TaskSpec, base_runner: Box<dyn TaskRunner>) -> ExecutionRequest {
    let remote_host = spec.host.as_deref();
    let is_remote = remote_host.is_some();

    let env = resolve_environment(&spec.env, remote_host);

    let runner = configure_caching(
        base_runner,
        &CacheConfig {
            enabled: spec.enable_model_caching,
            host_path: spec.model_cache_path.clone(),
            remote_host: remote_host.map(str::to_string),
        },
    );

    let output_files: BTreeSet<String> = spec.output_files.iter().cloned().collect();
    let commands = rewrite_commands(spec.commands.clone(), !output_files.is_empty());

    let before_commands = if is_remote {
        None
    } else {
        Some(vec![BOOTSTRAP_COMMAND.to_string()])
    };

    tracing::debug!(
        "planned run: runner={}, remote={}, commands={}, output_files={}",
        runner.name(),
        is_remote,
        commands.len(),
        output_files.len()
    );

    ExecutionRequest {
        commands,
        before_commands,
        env,
        runner,
        output_files,
        interpreter: spec.interpreter.clone(),
        container_image: spec.container_image.clone(),
    }
}
