mod load;
mod task;
mod types;

pub use load::{get_data_dir, load_default, load_from_path, load_task};
pub use task::{
    default_interpreter, DockerRunnerConfig, ProcessRunnerConfig, RunnerConfig, TaskConfig,
    TaskSpec, DEFAULT_IMAGE,
};
pub use types::{AppConfig, LoggingConfig, StorageConfig};
