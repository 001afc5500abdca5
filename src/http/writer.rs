use std::time::Duration;

use anyhow::Context;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::response::Response;

/// Buffer size for streaming file bodies.
const BUFFER_SIZE: usize = 8192;

/// Serializes `resp` into its exact wire form.
pub fn serialize_response(resp: &Response) -> Bytes {
    let mut buf = BytesMut::with_capacity(256 + resp.body.len());

    // Status line
    buf.put_slice(resp.version.as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(resp.status.as_u16().to_string().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(resp.status.reason_phrase().as_bytes());
    buf.put_slice(b"\r\n");

    // Headers
    for (k, v) in &resp.headers {
        buf.put_slice(k.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(v.as_bytes());
        buf.put_slice(b"\r\n");
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    // Body
    buf.put_slice(&resp.body);

    buf.freeze()
}

/// How a write attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Complete,
    /// The peer accepted no bytes for a whole idle period.
    TimedOut,
}

/// Writes a serialized response, followed by an optional file body that is
/// streamed rather than buffered.
pub struct ResponseWriter {
    buffer: Bytes,
    written: usize,
    file: Option<(File, u64)>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
            file: None,
        }
    }

    /// Appends the first `len` bytes of `file` after the serialized response.
    pub fn with_file(mut self, file: File, len: u64) -> Self {
        self.file = Some((file, len));
        self
    }

    /// Writes everything out. Each chunk must be accepted within `idle`,
    /// otherwise the attempt is abandoned with [`WriteOutcome::TimedOut`].
    pub async fn write_to_stream<W>(
        &mut self,
        stream: &mut W,
        idle: Duration,
    ) -> anyhow::Result<WriteOutcome>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = match timeout(idle, stream.write(&self.buffer[self.written..])).await {
                Ok(res) => res.context("failed to write response")?,
                Err(_) => return Ok(WriteOutcome::TimedOut),
            };

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        if let Some((file, len)) = self.file.take() {
            let mut body = file.take(len);
            let mut chunk = vec![0u8; BUFFER_SIZE];

            loop {
                let n = body.read(&mut chunk).await.context("failed to read body")?;
                if n == 0 {
                    break;
                }

                match timeout(idle, stream.write_all(&chunk[..n])).await {
                    Ok(res) => res.context("failed to write body")?,
                    Err(_) => return Ok(WriteOutcome::TimedOut),
                }
            }
        }

        match timeout(idle, stream.flush()).await {
            Ok(res) => res.context("failed to flush response")?,
            Err(_) => return Ok(WriteOutcome::TimedOut),
        }

        Ok(WriteOutcome::Complete)
    }
}
