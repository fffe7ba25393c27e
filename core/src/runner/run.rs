use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RunnerError;
use crate::util::TailBuffer;

use super::io_pump::{pump, LineStream, LineTap};
use super::output::{forward_lines, LogConsumer};
use super::traits::RunnerSession;
use super::types::RunOutcome;

const LINE_CHANNEL_CAPACITY: usize = 1024;

/// How long output is still read after the session exits. Background processes started by
/// the script (a local `ollama serve`) can keep the pipes open indefinitely.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub struct RunSessionArgs {
    pub session: Box<dyn RunnerSession>,
    pub log_consumer: Arc<dyn LogConsumer>,
    pub capture_bytes: usize,
    pub drain_timeout: Duration,
}

/// Drives a started session to completion: pumps both streams into the log consumer,
/// waits for exit and returns the exit code with stream tails.
pub async fn run_session(args: RunSessionArgs) -> Result<RunOutcome, RunnerError> {
    let RunSessionArgs {
        mut session,
        log_consumer,
        capture_bytes,
        drain_timeout,
    } = args;
    let started = Instant::now();

    let stdout_tail = Arc::new(TailBuffer::new(capture_bytes));
    let stderr_tail = Arc::new(TailBuffer::new(capture_bytes));
    let (line_tx, line_rx) = mpsc::channel::<LineTap>(LINE_CHANNEL_CAPACITY);

    let mut pumps = Vec::with_capacity(2);
    if let Some(out) = session.stdout() {
        pumps.push(pump(
            out,
            stdout_tail.clone(),
            line_tx.clone(),
            LineStream::Stdout,
        ));
    }
    if let Some(err) = session.stderr() {
        pumps.push(pump(
            err,
            stderr_tail.clone(),
            line_tx.clone(),
            LineStream::Stderr,
        ));
    }
    drop(line_tx);

    let forward = tokio::spawn(forward_lines(line_rx, log_consumer));

    let exit_code = session.wait().await?;

    let drain_deadline = tokio::time::Instant::now() + drain_timeout;
    for handle in pumps {
        drain(handle, drain_deadline).await?;
    }
    let lines = match forward.await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("output forwarder failed: {}", e);
            0
        }
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    tracing::debug!(
        "session finished: exit_code={}, lines={}, duration_ms={}",
        exit_code,
        lines,
        duration_ms
    );

    Ok(RunOutcome {
        exit_code,
        duration_ms: Some(duration_ms),
        stdout_tail: stdout_tail.text(),
        stderr_tail: stderr_tail.text(),
    })
}

/// Waits for a pump until `deadline`, then aborts it. Aborting drops its line sender.
async fn drain(
    mut handle: JoinHandle<Result<u64, RunnerError>>,
    deadline: tokio::time::Instant,
) -> Result<(), RunnerError> {
    match tokio::time::timeout_at(deadline, &mut handle).await {
        Ok(joined) => {
            let bytes = joined
                .map_err(|e| RunnerError::Spawn(format!("output pump panicked: {e}")))??;
            tracing::debug!("output pump finished after {} bytes", bytes);
        }
        Err(_) => {
            handle.abort();
            tracing::warn!("output still open after the session exited; stopped reading it");
        }
    }
    Ok(())
}
