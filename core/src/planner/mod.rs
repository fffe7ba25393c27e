//! CommandPlanner: turns a rendered task into an [`ExecutionRequest`].
//!
//! Three steps, composed by [`build_execution_request`]:
//! environment resolution, cache mount configuration and command rewriting.
//! Whether a remote server is configured is decided once and drives all three.
mod caching;
mod commands;
mod environment;
mod request;

pub use caching::{cache_mount, configure_caching, CacheConfig, MountStrategy};
pub use commands::{is_remove_model, rewrite_commands};
pub use environment::resolve_environment;
pub use request::{build_execution_request, ExecutionRequest};

/// Environment variable the ollama client reads to find its server.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Where ollama keeps model weights inside the container.
pub const MODEL_DIR: &str = "/root/.ollama";

/// Named volume shared by every run that uses default caching.
pub const MODEL_CACHE_VOLUME: &str = "ollama-models";

pub const REMOVE_MODEL_MARKER: &str = "ollama rm";

pub const FLUSH_COMMAND: &str = "sync";

/// Starts a local server and gives it time to bind before the first command.
pub const BOOTSTRAP_COMMAND: &str = "ollama serve & sleep 5";
