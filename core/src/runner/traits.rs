use std::fmt::Debug;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::types::{RunnerStartArgs, VolumeMount};

#[async_trait]
pub trait RunnerSession: Send {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>>;
    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>>;
    async fn kill(&mut self) -> anyhow::Result<()>;
    async fn wait(&mut self) -> anyhow::Result<i32>;
}

/// Execution environment for a task's commands.
///
/// Runners are immutable values: capabilities are queried, and a configured copy is
/// produced with [`TaskRunner::with_volumes`] instead of mutating a shared runner.
#[async_trait]
pub trait TaskRunner: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Whether [`TaskRunner::with_volumes`] produces a runner.
    fn supports_volume_mounts(&self) -> bool {
        false
    }

    fn volumes(&self) -> &[VolumeMount] {
        &[]
    }

    /// A copy of this runner with exactly `volumes` mounted. `None` when mounts are unsupported.
    fn with_volumes(&self, _volumes: Vec<VolumeMount>) -> Option<Box<dyn TaskRunner>> {
        None
    }

    fn box_clone(&self) -> Box<dyn TaskRunner>;

    async fn start_session(&self, args: &RunnerStartArgs)
        -> anyhow::Result<Box<dyn RunnerSession>>;
}

impl Clone for Box<dyn TaskRunner> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
