#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ollama_task_core::api::{ProcessRunnerConfig, RunnerConfig};
use ollama_task_plugins::executor::ShellCommandExecutor;
use ollama_task_plugins::storage::LocalStorage;

const FAKE_OLLAMA: &str = r#"#!/bin/sh
case "$1" in
  serve) exec sleep 60 ;;
  pull) echo "pulling manifest for $2" >&2 ;;
  run) echo "I am $2" ;;
  rm) echo "deleted '$2'" ;;
  *) echo "unknown command $1" >&2; exit 2 ;;
esac
"#;

pub struct Sandbox {
    pub dir: tempfile::TempDir,
    pub storage: Arc<LocalStorage>,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        write_executable(&bin.join("ollama"), FAKE_OLLAMA);
        let storage = Arc::new(LocalStorage::new(dir.path().join("store")));
        Self { dir, storage }
    }

    pub fn executor(&self) -> ShellCommandExecutor {
        ShellCommandExecutor::new(self.storage.clone(), self.dir.path().join("work"))
    }

    /// Env that puts the stub `ollama` first on PATH.
    pub fn env(&self) -> HashMap<String, String> {
        let path = format!(
            "{}:{}",
            self.dir.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        HashMap::from([("PATH".to_string(), path)])
    }

    pub fn work_root(&self) -> PathBuf {
        self.dir.path().join("work")
    }
}

pub fn process_runner() -> RunnerConfig {
    RunnerConfig::Process(ProcessRunnerConfig::default())
}

fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}
