use anyhow::Result;
use async_trait::async_trait;
use ollama_task_core::api::RunnerSession;
use tokio::io::AsyncRead;
use tokio::process::Child;

/// Session over a spawned child process (a shell or a `docker run` client).
pub(crate) struct ChildSession {
    child: Child,
    /// Process group led by the child. Whatever the script left running in it is
    /// terminated once the child exits.
    process_group: Option<u32>,
}

impl ChildSession {
    pub(crate) fn new(child: Child) -> Self {
        Self {
            child,
            process_group: None,
        }
    }

    /// The child was spawned with `process_group(0)`, so its pid is the group id.
    pub(crate) fn group_leader(child: Child) -> Self {
        let process_group = child.id();
        Self {
            child,
            process_group,
        }
    }

    fn terminate_group(&mut self) {
        let Some(pgid) = self.process_group.take() else {
            return;
        };
        signal_group(pgid);
    }
}

#[cfg(unix)]
fn signal_group(pgid: u32) {
    // SAFETY: killpg takes plain integers and touches no memory.
    let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        tracing::debug!("terminated process group {}", pgid);
        return;
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() != Some(libc::ESRCH) {
        tracing::warn!("failed to terminate process group {}: {}", pgid, err);
    }
}

#[cfg(not(unix))]
fn signal_group(_pgid: u32) {}

#[async_trait]
impl RunnerSession for ChildSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    async fn kill(&mut self) -> Result<()> {
        self.terminate_group();
        self.child.kill().await?;
        Ok(())
    }

    async fn wait(&mut self) -> Result<i32> {
        let status = self.child.wait().await?;
        self.terminate_group();
        Ok(status.code().unwrap_or(-1))
    }
}

impl Drop for ChildSession {
    fn drop(&mut self) {
        self.terminate_group();
    }
}
