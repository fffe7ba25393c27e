use std::sync::Arc;

use tokio::sync::mpsc;

use super::io_pump::{LineStream, LineTap};

/// Receives every line a session writes.
pub trait LogConsumer: Send + Sync {
    fn accept(&self, line: &str, stream: LineStream);
}

/// Logs stdout at info and drops stderr.
///
/// `ollama pull` renders its progress bars on stderr; forwarding them floods the task log.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutLogConsumer;

impl LogConsumer for StdoutLogConsumer {
    fn accept(&self, line: &str, stream: LineStream) {
        if line.trim().is_empty() {
            return;
        }
        if stream == LineStream::Stdout {
            tracing::info!(target: "ollama_task::output", "{}", line);
        }
    }
}

/// Forwards taps to `consumer` until every sender is dropped. Returns the line count.
pub async fn forward_lines(mut rx: mpsc::Receiver<LineTap>, consumer: Arc<dyn LogConsumer>) -> u64 {
    let mut lines = 0u64;
    while let Some(tap) = rx.recv().await {
        consumer.accept(&tap.line, tap.stream);
        lines += 1;
    }
    lines
}
