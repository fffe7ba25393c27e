use std::path::{Path, PathBuf};
use std::sync::Arc;

use ollama_task_core::api::{RunnerConfig, RunnerError, StorageConfig, TaskRunner};

use crate::executor::ShellCommandExecutor;
use crate::runner::{DockerTaskRunner, ProcessTaskRunner};
use crate::storage::LocalStorage;

pub fn build_runner(cfg: &RunnerConfig) -> Result<Box<dyn TaskRunner>, RunnerError> {
    match cfg {
        RunnerConfig::Docker(d_cfg) => Ok(Box::new(DockerTaskRunner::from_config(d_cfg)?)),
        RunnerConfig::Process(p_cfg) => Ok(Box::new(ProcessTaskRunner::from_config(p_cfg))),
    }
}

pub fn build_storage(cfg: &StorageConfig) -> LocalStorage {
    LocalStorage::new(absolute(Path::new(&cfg.directory)))
}

pub fn build_executor(cfg: &StorageConfig) -> ShellCommandExecutor {
    let workdir_root = cfg
        .workdir
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| absolute(Path::new(s)))
        .unwrap_or_else(|| std::env::temp_dir().join("ollama-task"));

    ShellCommandExecutor::new(Arc::new(build_storage(cfg)), workdir_root)
        .keep_workdir(cfg.keep_workdir)
}

/// Docker bind-mounts the run directory, and `docker run -v` reads a relative source as a
/// volume name.
fn absolute(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("cannot make {} absolute: {}", path.display(), e);
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollama_task_core::api::{DockerRunnerConfig, ProcessRunnerConfig};

    #[test]
    fn builds_runner_per_config_type() {
        let docker = build_runner(&RunnerConfig::Docker(DockerRunnerConfig::default())).unwrap();
        assert_eq!(docker.name(), "docker");
        assert!(docker.supports_volume_mounts());

        let process = build_runner(&RunnerConfig::Process(ProcessRunnerConfig::default())).unwrap();
        assert_eq!(process.name(), "process");
        assert!(!process.supports_volume_mounts());
    }

    #[test]
    fn relative_roots_become_absolute() {
        let cfg = StorageConfig {
            directory: "store".into(),
            workdir: Some("work".into()),
            keep_workdir: false,
        };

        let executor = build_executor(&cfg);
        assert!(executor.workdir_root().is_absolute());
        assert!(executor.workdir_root().ends_with("work"));

        let storage = build_storage(&cfg);
        assert!(storage.root().is_absolute());
        assert!(storage.root().ends_with("store"));
    }
}
