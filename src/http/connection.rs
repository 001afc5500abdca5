use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info};

use crate::http::classify::classify;
use crate::http::mime;
use crate::http::parser::{find_line_end, parse_http_request};
use crate::http::request::Request;
use crate::http::resolver::{DocumentRoot, Resource};
use crate::http::response::{DEFAULT_VERSION, Response, StatusCode};
use crate::http::writer::{ResponseWriter, WriteOutcome};

/// Largest request line accepted, and the size of a single read.
pub const READ_CHUNK: usize = 1024;

/// Serves exactly one request on a stream, then closes it.
pub struct Connection<S> {
    stream: S,
    docroot: Arc<DocumentRoot>,
    read_timeout: Duration,
    write_timeout: Duration,
    buffer: Vec<u8>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Parsing,
    Resolving(Request),
    Classifying(Request, Resource),
    BuildingResponse(Outcome),
    Writing(ResponseWriter),
    Closed,
}

/// What the response should say, decided before any bytes are produced.
pub struct Outcome {
    status: StatusCode,
    request: Option<Request>,
    resource: Option<Resource>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// `read_timeout` bounds the wait for the whole request line;
    /// `write_timeout` bounds each stall while writing the response.
    pub fn new(
        stream: S,
        docroot: Arc<DocumentRoot>,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            docroot,
            read_timeout,
            write_timeout,
            buffer: Vec::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to `Closed`.
    ///
    /// Returns an error only for transport faults; every protocol problem
    /// is answered with a status response.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => {
                    if self.read_request_line().await? {
                        ConnectionState::Parsing
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Parsing => self.parse(),

                ConnectionState::Resolving(req) => {
                    let resource = self.docroot.resolve(req.path()).await;
                    ConnectionState::Classifying(req, resource)
                }

                ConnectionState::Classifying(req, resource) => {
                    let status =
                        classify(req.is_valid_method(), resource.is_valid(), resource.exists());
                    ConnectionState::BuildingResponse(Outcome {
                        status,
                        request: Some(req),
                        resource: Some(resource),
                    })
                }

                ConnectionState::BuildingResponse(outcome) => {
                    let prepared = build_response(outcome).await;
                    let mut writer = ResponseWriter::new(&prepared.response);
                    if let Some((file, len)) = prepared.file {
                        writer = writer.with_file(file, len);
                    }
                    ConnectionState::Writing(writer)
                }

                ConnectionState::Writing(mut writer) => {
                    let outcome = writer
                        .write_to_stream(&mut self.stream, self.write_timeout)
                        .await?;
                    if outcome == WriteOutcome::TimedOut {
                        debug!("write timed out");
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        // The peer may already be gone; nothing is left to deliver.
        let _ = self.stream.shutdown().await;
        Ok(())
    }

    /// Reads until the buffer holds a full request line, fills up, or the
    /// peer stops sending. Returns `false` when there is nothing to answer.
    async fn read_request_line(&mut self) -> anyhow::Result<bool> {
        let deadline = Instant::now() + self.read_timeout;
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if find_line_end(&self.buffer).is_some() || self.buffer.len() >= READ_CHUNK {
                return Ok(true);
            }

            let remaining = READ_CHUNK - self.buffer.len();
            let read = timeout_at(deadline, self.stream.read(&mut chunk[..remaining])).await;

            let n = match read {
                Ok(res) => res.context("failed to read request")?,
                Err(_) => {
                    debug!(buffered = self.buffer.len(), "read timed out");
                    return Ok(false);
                }
            };

            if n == 0 {
                return Ok(!self.buffer.is_empty());
            }

            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    fn parse(&self) -> ConnectionState {
        let parsed = if find_line_end(&self.buffer).is_none() && self.buffer.len() >= READ_CHUNK {
            debug!("request line exceeds {} bytes", READ_CHUNK);
            None
        } else {
            match parse_http_request(&self.buffer) {
                Ok(req) => Some(req),
                Err(e) => {
                    debug!(error = %e, "rejecting request");
                    None
                }
            }
        };

        match parsed {
            Some(req) => ConnectionState::Resolving(req),
            None => ConnectionState::BuildingResponse(Outcome {
                status: StatusCode::BadRequest,
                request: None,
                resource: None,
            }),
        }
    }
}

/// A response plus the file its body is streamed from, if any.
pub(crate) struct PreparedResponse {
    pub(crate) response: Response,
    pub(crate) file: Option<(File, u64)>,
}

/// Opens the body file for 200 GET before anything is sent, so a failed
/// open can still turn into 404.
pub(crate) async fn build_response(outcome: Outcome) -> PreparedResponse {
    let Outcome {
        mut status,
        request,
        resource,
    } = outcome;

    let version = request.as_ref().map_or(DEFAULT_VERSION, |req| req.version());
    let content_type = resource.as_ref().map_or(mime::FALLBACK, |res| res.content_type());
    let head = request.as_ref().is_some_and(|req| req.is_head());

    let mut content_length = None;
    let mut body = None;

    if status == StatusCode::Ok {
        if let Some(res) = &resource {
            if head {
                content_length = Some(res.len());
            } else if let Some(path) = res.file() {
                match File::open(path).await {
                    Ok(file) => {
                        content_length = Some(res.len());
                        body = Some((file, res.len()));
                    }
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "failed to open resource");
                        status = StatusCode::NotFound;
                    }
                }
            }
        }
    }

    if let Some(req) = &request {
        info!(
            method = %req.method(),
            path = %req.path(),
            status = status.as_u16(),
            "request served"
        );
    } else {
        info!(status = status.as_u16(), "malformed request");
    }

    let mut builder = Response::standard(status, version, content_type);
    if let Some(len) = content_length {
        builder = builder.header("Content-Length", len.to_string());
    }

    PreparedResponse {
        response: builder.build(),
        file: body,
    }
}
