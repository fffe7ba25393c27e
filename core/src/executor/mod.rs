//! The command execution engine seam.
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::planner::ExecutionRequest;
use crate::storage::StorageUri;

/// Result of one run, passed through to the caller unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptOutput {
    pub run_id: String,
    pub exit_code: i32,
    /// Declared output file name -> stored artifact.
    pub output_files: BTreeMap<String, StorageUri>,
    pub duration_ms: Option<u64>,
    pub stdout_tail: String,
}

impl ScriptOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a planned request. Non-zero exit codes are reported in [`ScriptOutput`], not as errors.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> Result<ScriptOutput, TaskError>;
}
