use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::resolver::DocumentRoot;

/// Pause after a failed accept, so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections and hands each one to its own task.
///
/// At most `workers` connections are served at once. When every worker is
/// busy the listener stops accepting and further clients queue in the
/// kernel backlog.
pub struct Listener {
    listener: TcpListener,
    workers: Arc<Semaphore>,
    docroot: Arc<DocumentRoot>,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl Listener {
    pub async fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let docroot = DocumentRoot::new(&cfg.static_files.root)?;

        let (host, port) = cfg.server.bind_target();
        let addr = lookup_host((host, port))
            .await
            .with_context(|| format!("failed to resolve {}:{}", host, port))?
            .next()
            .ok_or_else(|| anyhow!("no address found for {}:{}", host, port))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }?;
        socket.set_reuseaddr(true)?;
        socket
            .bind(addr)
            .with_context(|| format!("failed to bind {}", addr))?;
        let listener = socket
            .listen(cfg.server.backlog)
            .with_context(|| format!("failed to listen on {}", addr))?;

        info!(
            addr = %listener.local_addr()?,
            docroot = %docroot.path().display(),
            workers = cfg.server.workers,
            "Listening"
        );

        Ok(Self {
            listener,
            workers: Arc::new(Semaphore::new(cfg.server.workers)),
            docroot: Arc::new(docroot),
            read_timeout: cfg.server.read_timeout(),
            write_timeout: cfg.server.write_timeout(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the task is dropped.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let permit = Arc::clone(&self.workers)
                .acquire_owned()
                .await
                .context("worker pool closed")?;

            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            debug!(%peer, "Accepted connection");

            let docroot = Arc::clone(&self.docroot);
            let read_timeout = self.read_timeout;
            let write_timeout = self.write_timeout;

            tokio::spawn(
                async move {
                    let _permit = permit;
                    let mut conn = Connection::new(socket, docroot, read_timeout, write_timeout);
                    if let Err(e) = conn.run().await {
                        warn!("Connection error: {:#}", e);
                    }
                }
                .instrument(info_span!("conn", %peer)),
            );
        }
    }
}
