//! Task definition: the options a caller sets, and their rendered form.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::property::{render_optional, Property, RunContext};

pub const DEFAULT_IMAGE: &str = "ollama/ollama";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Shell commands, run in order.
    pub commands: Property<Vec<String>>,

    /// Extra environment variables for the commands.
    #[serde(default)]
    pub env: Option<Property<HashMap<String, String>>>,

    #[serde(default, alias = "taskRunner")]
    pub task_runner: RunnerConfig,

    #[serde(default = "default_container_image", alias = "containerImage")]
    pub container_image: Property<String>,

    /// Files (or glob patterns) to capture from the working directory after the run.
    #[serde(default, alias = "outputFiles")]
    pub output_files: Option<Property<Vec<String>>>,

    #[serde(default = "default_enable_model_caching", alias = "enableModelCaching")]
    pub enable_model_caching: Property<bool>,

    /// Host directory for model weights. Unset means the shared named volume.
    #[serde(default, alias = "modelCachePath")]
    pub model_cache_path: Option<Property<String>>,

    /// Remote Ollama server. When set, no local server is started and no cache is mounted.
    #[serde(default)]
    pub host: Option<Property<String>>,

    #[serde(default = "default_interpreter")]
    pub interpreter: Vec<String>,
}

fn default_container_image() -> Property<String> {
    Property::of(DEFAULT_IMAGE.to_string())
}

fn default_enable_model_caching() -> Property<bool> {
    Property::of(true)
}

pub fn default_interpreter() -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string()]
}

impl TaskConfig {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: Property::of(commands.into_iter().map(Into::into).collect()),
            env: None,
            task_runner: RunnerConfig::default(),
            container_image: default_container_image(),
            output_files: None,
            enable_model_caching: default_enable_model_caching(),
            model_cache_path: None,
            host: None,
            interpreter: default_interpreter(),
        }
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(Property::of(env));
        self
    }

    pub fn with_task_runner(mut self, runner: RunnerConfig) -> Self {
        self.task_runner = runner;
        self
    }

    pub fn with_output_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_files = Some(Property::of(files.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_model_caching(mut self, enabled: bool) -> Self {
        self.enable_model_caching = Property::of(enabled);
        self
    }

    pub fn with_model_cache_path(mut self, path: impl Into<Property<String>>) -> Self {
        self.model_cache_path = Some(path.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<Property<String>>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Resolves every property against `ctx`. Fails before anything is executed.
    pub fn render(&self, ctx: &RunContext) -> Result<TaskSpec, TaskError> {
        let commands = self.commands.render("commands", ctx)?;
        if commands.is_empty() {
            return Err(TaskError::Config("commands must not be empty".into()));
        }

        let env = match &self.env {
            Some(p) => p.render("env", ctx)?,
            None => HashMap::new(),
        };

        let container_image = self.container_image.render("container_image", ctx)?;
        if container_image.trim().is_empty() {
            return Err(TaskError::Config("container_image must not be empty".into()));
        }

        let output_files = match &self.output_files {
            Some(p) => p.render("output_files", ctx)?,
            None => Vec::new(),
        };

        let model_cache_path = render_optional(self.model_cache_path.as_ref(), "model_cache_path", ctx)?
            .map(|p| shellexpand::tilde(&p).into_owned());

        let host = render_optional(self.host.as_ref(), "host", ctx)?;

        if self.interpreter.is_empty() {
            return Err(TaskError::Config("interpreter must not be empty".into()));
        }

        Ok(TaskSpec {
            commands,
            env,
            container_image,
            output_files,
            enable_model_caching: self.enable_model_caching.render("enable_model_caching", ctx)?,
            model_cache_path,
            host,
            interpreter: self.interpreter.clone(),
        })
    }
}

/// A [`TaskConfig`] with every property rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSpec {
    pub commands: Vec<String>,
    pub env: HashMap<String, String>,
    pub container_image: String,
    pub output_files: Vec<String>,
    pub enable_model_caching: bool,
    pub model_cache_path: Option<String>,
    pub host: Option<String>,
    pub interpreter: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunnerConfig {
    Docker(DockerRunnerConfig),
    Process(ProcessRunnerConfig),
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig::Docker(DockerRunnerConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerRunnerConfig {
    /// Image used when the task does not override it.
    #[serde(default = "default_docker_image")]
    pub image: String,

    /// Pre-existing mounts, `source:target`.
    #[serde(default)]
    pub volumes: Vec<String>,

    #[serde(default)]
    pub network: Option<String>,

    /// Passed to `docker run --pull` (always / missing / never).
    #[serde(default, alias = "pullPolicy")]
    pub pull_policy: Option<String>,

    #[serde(default = "default_docker_bin")]
    pub docker_bin: String,

    /// Passed to `docker run --user`, e.g. "1000:1000". With the default (root), files the
    /// commands write into the run directory belong to root on the host.
    #[serde(default)]
    pub user: Option<String>,
}

fn default_docker_image() -> String {
    DEFAULT_IMAGE.to_string()
}

fn default_docker_bin() -> String {
    "docker".to_string()
}

impl Default for DockerRunnerConfig {
    fn default() -> Self {
        Self {
            image: default_docker_image(),
            volumes: Vec::new(),
            network: None,
            pull_policy: None,
            docker_bin: default_docker_bin(),
            user: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRunnerConfig {
    /// Start commands with the caller's environment (PATH in particular).
    #[serde(default = "default_inherit_env")]
    pub inherit_env: bool,
}

fn default_inherit_env() -> bool {
    true
}

impl Default for ProcessRunnerConfig {
    fn default() -> Self {
        Self {
            inherit_env: default_inherit_env(),
        }
    }
}
