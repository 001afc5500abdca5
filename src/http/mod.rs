//! HTTP protocol implementation.
//!
//! A minimal HTTP/1.1 static file server: one request line per connection,
//! `GET` and `HEAD` only, no keep-alive.
//!
//! # Architecture
//!
//! - **`connection`**: Per-connection state machine, from first read to close
//! - **`parser`**: Parses the request line out of the first bytes received
//! - **`request`**: Request line representation and method tokens
//! - **`resolver`**: Maps request targets onto files under the document root
//! - **`mime`**: Content-type table keyed by file extension
//! - **`classify`**: Derives the status code from the request and resource
//! - **`response`**: Status codes and the response builder
//! - **`writer`**: Serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the request line (bounded by a timeout)
//!        └──────┬──────┘
//!               │             └─ nothing received → Closed
//!               ▼
//!        ┌─────────────┐
//!        │   Parsing   │ ─── malformed ──────────┐
//!        └──────┬──────┘                         │
//!               ▼                                │
//!        ┌─────────────┐                         │
//!        │  Resolving  │ ← Probe document root   │
//!        └──────┬──────┘                         │
//!               ▼                                │
//!        ┌─────────────┐                         │
//!        │ Classifying │ ← 405 / 403 / 404 / 200 │
//!        └──────┬──────┘                         │
//!               ▼                                ▼
//!        ┌──────────────────┐
//!        │ BuildingResponse │ ← Open file for 200 GET, 400 if malformed
//!        └──────┬───────────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Writing   │ ← Head, then streamed body (bounded stalls)
//!        └──────┬──────┘
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use statik::http::connection::Connection;
//! use statik::http::resolver::DocumentRoot;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let docroot = Arc::new(DocumentRoot::new("./DOC")?);
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let docroot = Arc::clone(&docroot);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(
//!                 socket,
//!                 docroot,
//!                 Duration::from_secs(10),
//!                 Duration::from_secs(10),
//!             );
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod classify;
pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod response;
pub mod writer;
