//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `ollama_task_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, load_task, AppConfig, DockerRunnerConfig, LoggingConfig,
    ProcessRunnerConfig, RunnerConfig, StorageConfig, TaskConfig, TaskSpec, DEFAULT_IMAGE,
};
pub use crate::engine::{plan_task, run_task, RunTaskArgs};
pub use crate::error::{CliError, RunnerError, TaskError};
pub use crate::executor::{CommandExecutor, ScriptOutput};
pub use crate::planner::{
    build_execution_request, configure_caching, resolve_environment, rewrite_commands,
    CacheConfig, ExecutionRequest, BOOTSTRAP_COMMAND, FLUSH_COMMAND, MODEL_CACHE_VOLUME,
    MODEL_DIR, OLLAMA_HOST_ENV,
};
pub use crate::property::{Property, RenderError, RunContext};
pub use crate::runner::{
    run_session, LineStream, LogConsumer, RunOutcome, RunSessionArgs, RunnerSession,
    RunnerStartArgs, StdoutLogConsumer, TaskRunner, VolumeMount, DEFAULT_DRAIN_TIMEOUT,
};
pub use crate::storage::{Storage, StorageUri};
