use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use ollama_task_core::api::{
    run_session, CommandExecutor, ExecutionRequest, LogConsumer, RunSessionArgs, RunnerError,
    RunnerStartArgs, ScriptOutput, StdoutLogConsumer, Storage, StorageUri, TaskError,
    DEFAULT_DRAIN_TIMEOUT,
};

const DEFAULT_CAPTURE_BYTES: usize = 64 * 1024;

/// Runs a request's script in a fresh working directory and stores its output files.
pub struct ShellCommandExecutor {
    storage: Arc<dyn Storage>,
    workdir_root: PathBuf,
    keep_workdir: bool,
    log_consumer: Arc<dyn LogConsumer>,
    capture_bytes: usize,
    drain_timeout: Duration,
}

impl ShellCommandExecutor {
    pub fn new(storage: Arc<dyn Storage>, workdir_root: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            workdir_root: workdir_root.into(),
            keep_workdir: false,
            log_consumer: Arc::new(StdoutLogConsumer),
            capture_bytes: DEFAULT_CAPTURE_BYTES,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn keep_workdir(mut self, keep: bool) -> Self {
        self.keep_workdir = keep;
        self
    }

    pub fn with_log_consumer(mut self, consumer: Arc<dyn LogConsumer>) -> Self {
        self.log_consumer = consumer;
        self
    }

    pub fn with_capture_bytes(mut self, bytes: usize) -> Self {
        self.capture_bytes = bytes;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn workdir_root(&self) -> &Path {
        &self.workdir_root
    }

    async fn run_in(
        &self,
        workdir: &Path,
        run_id: &str,
        request: ExecutionRequest,
    ) -> Result<ScriptOutput, TaskError> {
        let start = RunnerStartArgs {
            interpreter: request.interpreter.clone(),
            script: request.script(),
            envs: request.env.clone(),
            working_dir: workdir.to_path_buf(),
            container_image: Some(request.container_image.clone()),
        };

        tracing::info!(
            "run {} started at {} on runner '{}'",
            run_id,
            Local::now().to_rfc3339(),
            request.runner.name()
        );

        let session = request
            .runner
            .start_session(&start)
            .await
            .map_err(|e| RunnerError::Spawn(e.to_string()))?;

        let outcome = run_session(RunSessionArgs {
            session,
            log_consumer: self.log_consumer.clone(),
            capture_bytes: self.capture_bytes,
            drain_timeout: self.drain_timeout,
        })
        .await?;

        if outcome.exit_code != 0 {
            tracing::warn!(
                "run {} exited with {}: {}",
                run_id,
                outcome.exit_code,
                outcome.stderr_tail.trim()
            );
        }

        let output_files = self
            .capture_outputs(workdir, run_id, &request.output_files)
            .await?;

        Ok(ScriptOutput {
            run_id: run_id.to_string(),
            exit_code: outcome.exit_code,
            output_files,
            duration_ms: outcome.duration_ms,
            stdout_tail: outcome.stdout_tail,
        })
    }

    /// Copies declared outputs into storage. Entries with glob metacharacters are patterns.
    ///
    /// Files that were not produced are left out of the mapping; the caller judges the run
    /// by its exit code.
    async fn capture_outputs(
        &self,
        workdir: &Path,
        run_id: &str,
        declared: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, StorageUri>, TaskError> {
        let mut stored = BTreeMap::new();
        for entry in declared {
            for name in resolve_declared(workdir, entry)? {
                let local = workdir.join(&name);
                let uri = self
                    .storage
                    .put_file(run_id, &name, &local)
                    .await
                    .map_err(|e| TaskError::Storage(e.to_string()))?;
                tracing::debug!("captured {} -> {}", name, uri);
                stored.insert(name, uri);
            }
            if !is_pattern(entry) && !stored.contains_key(entry) {
                tracing::warn!("output file '{}' was not produced", entry);
            }
        }
        Ok(stored)
    }
}

fn is_pattern(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

/// Names (relative to `workdir`) of the existing files an entry refers to.
fn resolve_declared(workdir: &Path, entry: &str) -> Result<Vec<String>, TaskError> {
    let rel = Path::new(entry);
    if rel.is_absolute() || rel.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(TaskError::Config(format!(
            "output file '{}' must be relative to the working directory",
            entry
        )));
    }

    if !is_pattern(entry) {
        return Ok(if workdir.join(rel).is_file() {
            vec![entry.to_string()]
        } else {
            vec![]
        });
    }

    let pattern = workdir.join(rel);
    let paths = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| TaskError::Config(format!("invalid output pattern '{}': {}", entry, e)))?;
    let mut names = Vec::new();
    for path in paths.flatten() {
        if !path.is_file() {
            continue;
        }
        if let Ok(name) = path.strip_prefix(workdir) {
            names.push(name.to_string_lossy().to_string());
        }
    }
    if names.is_empty() {
        tracing::warn!("output pattern '{}' matched no files", entry);
    }
    Ok(names)
}

#[async_trait]
impl CommandExecutor for ShellCommandExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<ScriptOutput, TaskError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let workdir = self.workdir_root.join(&run_id);
        tokio::fs::create_dir_all(&workdir).await?;

        let result = self.run_in(&workdir, &run_id, request).await;

        // Files written by a container running as root cannot be removed by a non-root
        // host user; set the docker runner's `user` to avoid leftovers.
        if self.keep_workdir {
            tracing::info!("keeping working directory {}", workdir.display());
        } else if let Err(e) = tokio::fs::remove_dir_all(&workdir).await {
            tracing::warn!(
                "failed to remove {}: {} (container-owned files? see the docker runner's `user`)",
                workdir.display(),
                e
            );
        }
        result
    }
}
