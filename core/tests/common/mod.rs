#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ollama_task_core::api::{
    CommandExecutor, ExecutionRequest, RunnerSession, RunnerStartArgs, ScriptOutput, StorageUri,
    TaskError, TaskRunner, VolumeMount,
};

/// Container-like runner: accepts mounts, never starts.
#[derive(Debug, Clone, Default)]
pub struct FakeContainerRunner {
    pub volumes: Vec<VolumeMount>,
}

impl FakeContainerRunner {
    pub fn with_existing(volumes: Vec<VolumeMount>) -> Box<dyn TaskRunner> {
        Box::new(Self { volumes })
    }
}

#[async_trait]
impl TaskRunner for FakeContainerRunner {
    fn name(&self) -> &str {
        "fake-container"
    }

    fn supports_volume_mounts(&self) -> bool {
        true
    }

    fn volumes(&self) -> &[VolumeMount] {
        &self.volumes
    }

    fn with_volumes(&self, volumes: Vec<VolumeMount>) -> Option<Box<dyn TaskRunner>> {
        Some(Box::new(Self { volumes }))
    }

    fn box_clone(&self) -> Box<dyn TaskRunner> {
        Box::new(self.clone())
    }

    async fn start_session(&self, _args: &RunnerStartArgs) -> anyhow::Result<Box<dyn RunnerSession>> {
        anyhow::bail!("fake runner cannot start sessions")
    }
}

/// Runner without mount support.
#[derive(Debug, Clone, Default)]
pub struct FakeLocalRunner;

#[async_trait]
impl TaskRunner for FakeLocalRunner {
    fn name(&self) -> &str {
        "fake-local"
    }

    fn box_clone(&self) -> Box<dyn TaskRunner> {
        Box::new(self.clone())
    }

    async fn start_session(&self, _args: &RunnerStartArgs) -> anyhow::Result<Box<dyn RunnerSession>> {
        anyhow::bail!("fake runner cannot start sessions")
    }
}

/// What the executor was handed, without the runner box.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub script: String,
    pub commands: Vec<String>,
    pub before_commands: Option<Vec<String>>,
    pub volumes: Vec<VolumeMount>,
    pub output_files: Vec<String>,
}

/// Records requests and answers with a fixed exit code, "storing" every declared output.
#[derive(Default)]
pub struct RecordingExecutor {
    pub exit_code: i32,
    pub seen: Mutex<Vec<SeenRequest>>,
}

impl RecordingExecutor {
    pub fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, request: ExecutionRequest) -> Result<ScriptOutput, TaskError> {
        let output_files: BTreeMap<String, StorageUri> = request
            .output_files
            .iter()
            .map(|name| {
                let path = std::path::PathBuf::from("/store/run-1").join(name);
                (name.clone(), StorageUri::from_path(&path))
            })
            .collect();

        self.seen.lock().unwrap().push(SeenRequest {
            script: request.script(),
            commands: request.commands.clone(),
            before_commands: request.before_commands.clone(),
            volumes: request.runner.volumes().to_vec(),
            output_files: request.output_files.iter().cloned().collect(),
        });

        Ok(ScriptOutput {
            run_id: "run-1".to_string(),
            exit_code: self.exit_code,
            output_files,
            duration_ms: Some(1),
            stdout_tail: String::new(),
        })
    }
}

pub fn commands(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
