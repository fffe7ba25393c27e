use thiserror::Error;

use crate::property::RenderError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("task failed: {0}")]
    Task(#[from] TaskError),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("config error: {0}")]
    Config(String),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("runner failed: {0}")]
    Runner(#[from] RunnerError),
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskError {
    /// Configuration and rendering failures happen before anything runs.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Render(_) | Self::Runner(RunnerError::Config(_))
        )
    }
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("config error: {0}")]
    Config(String),
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("plugin error: {0}")]
    Plugin(#[from] anyhow::Error),
}
