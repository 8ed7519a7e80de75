use anyhow::anyhow;
use bytes::{Bytes, BytesMut};
use std::sync::{Arc, Mutex};
use wasmtime_wasi::{HostOutputStream, StdoutStream, StreamError, StreamResult, Subscribe};

/// Upper bound on how many unread bytes one captured stream buffers.
pub(crate) const CAPTURE_LIMIT: usize = 64 << 20;

/// An output stream whose bytes are handed to the embedder on request.
///
/// Reading consumes the data, so only bytes the embedder has not read yet
/// count against the limit.
#[derive(Clone)]
pub(crate) struct CapturePipe {
    limit: usize,
    buffer: Arc<Mutex<BytesMut>>,
}

impl CapturePipe {
    pub(crate) fn new(limit: usize) -> CapturePipe {
        CapturePipe {
            limit,
            buffer: Arc::new(Mutex::new(BytesMut::new())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BytesMut> {
        // Nothing panics while holding the lock, so a poisoned buffer is
        // still consistent.
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Moves up to `buf.len()` unread bytes into `buf`.
    pub(crate) fn read(&self, buf: &mut [u8]) -> usize {
        let mut buffer = self.lock();
        let n = buffer.len().min(buf.len());
        let chunk = buffer.split_to(n);
        buf[..n].copy_from_slice(&chunk);
        n
    }
}

impl StdoutStream for CapturePipe {
    fn stream(&self) -> Box<dyn HostOutputStream> {
        Box::new(self.clone())
    }

    fn isatty(&self) -> bool {
        false
    }
}

#[async_trait::async_trait]
impl HostOutputStream for CapturePipe {
    fn write(&mut self, bytes: Bytes) -> StreamResult<()> {
        let mut buffer = self.lock();
        if bytes.len() > self.limit - buffer.len() {
            return Err(StreamError::LastOperationFailed(anyhow!(
                "captured output exceeds {} unread bytes",
                self.limit
            )));
        }
        buffer.extend_from_slice(&bytes);
        Ok(())
    }

    fn flush(&mut self) -> StreamResult<()> {
        Ok(())
    }

    fn check_write(&mut self) -> StreamResult<usize> {
        let unread = self.lock().len();
        if unread < self.limit {
            Ok(self.limit - unread)
        } else {
            Err(StreamError::LastOperationFailed(anyhow!(
                "captured output exceeds {} unread bytes",
                self.limit
            )))
        }
    }
}

#[async_trait::async_trait]
impl Subscribe for CapturePipe {
    async fn ready(&mut self) {}
}
