use std::collections::VecDeque;
use std::sync::Mutex;

/// Last `limit` bytes written to a stream, shared between the pump that fills it and the
/// session that reports it.
#[derive(Debug)]
pub struct TailBuffer {
    limit: usize,
    bytes: Mutex<VecDeque<u8>>,
}

impl TailBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            bytes: Mutex::new(VecDeque::with_capacity(limit.min(64 * 1024))),
        }
    }

    pub fn append(&self, chunk: &[u8]) {
        let keep = &chunk[chunk.len().saturating_sub(self.limit)..];
        let mut bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        bytes.extend(keep);
        let excess = bytes.len().saturating_sub(self.limit);
        bytes.drain(..excess);
    }

    pub fn len(&self) -> usize {
        self.bytes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tail as text; invalid UTF-8 (e.g. a multi-byte char cut at the front) is replaced.
    pub fn text(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        let (front, back) = bytes.as_slices();
        let mut joined = Vec::with_capacity(bytes.len());
        joined.extend_from_slice(front);
        joined.extend_from_slice(back);
        String::from_utf8_lossy(&joined).into_owned()
    }
}
