//! End-to-end tests over real TCP sockets.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use common::{INDEX_HTML, RawResponse, ScratchDir, test_config};
use statik::config::Config;
use statik::server::Listener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn start(cfg: Config) -> SocketAddr {
    let listener = Listener::bind(&cfg).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run());
    addr
}

async fn request(addr: SocketAddr, raw: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    RawResponse::parse(&out)
}

fn site(name: &str) -> ScratchDir {
    let dir = ScratchDir::new(name);
    dir.write("index.html", INDEX_HTML);
    dir
}

#[tokio::test]
async fn test_post_is_method_not_allowed() {
    let dir = site("server-post");
    let addr = start(test_config(dir.path())).await;

    let resp = request(addr, b"POST /index.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn test_unknown_extension_is_forbidden() {
    let dir = site("server-exe");
    let addr = start(test_config(dir.path())).await;

    let resp = request(addr, b"GET /script.exe HTTP/1.1\r\n\r\n").await;

    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = site("server-missing");
    let addr = start(test_config(dir.path())).await;

    let resp = request(addr, b"GET /missing.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_get_serves_file() {
    let dir = site("server-get");
    let addr = start(test_config(dir.path())).await;

    let resp = request(addr, b"GET /index.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.header("Content-Type"), Some("text/html"));
    assert_eq!(resp.header("Content-Length"), Some("37"));
    assert_eq!(resp.body, INDEX_HTML);
}

#[tokio::test]
async fn test_head_omits_body() {
    let dir = site("server-head");
    let addr = start(test_config(dir.path())).await;

    let resp = request(addr, b"HEAD /index.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.header("Content-Length"), Some("37"));
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_path_traversal_is_never_served() {
    let dir = ScratchDir::new("server-traversal");
    dir.write("public/index.html", INDEX_HTML);
    dir.write("private.txt", b"secret");
    let addr = start(test_config(&dir.path().join("public"))).await;

    for raw in [
        &b"GET /../../etc/passwd HTTP/1.1\r\n\r\n"[..],
        b"GET /../private.txt HTTP/1.1\r\n\r\n",
        b"GET //../private.txt HTTP/1.1\r\n\r\n",
    ] {
        let resp = request(addr, raw).await;
        assert!(matches!(resp.status(), 403 | 404), "{}", resp.status_line);
        assert!(resp.body.is_empty());
    }
}

#[tokio::test]
async fn test_root_serves_index() {
    let dir = site("server-root");
    let addr = start(test_config(dir.path())).await;

    let resp = request(addr, b"GET / HTTP/1.1\r\n\r\n").await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body, INDEX_HTML);
}

#[tokio::test]
async fn test_workers_bound_concurrent_connections() {
    let dir = site("server-workers");
    let mut cfg = test_config(dir.path());
    cfg.server.workers = 1;
    let addr = start(cfg).await;

    // Holds the only worker without sending anything.
    let mut idle = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut waiting = TcpStream::connect(addr).await.unwrap();
    waiting
        .write_all(b"GET /index.html HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let mut buf = [0u8; 1];
    let early = tokio::time::timeout(Duration::from_millis(200), waiting.read(&mut buf)).await;
    assert!(early.is_err(), "second connection served while worker busy");

    idle.write_all(b"HEAD /index.html HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let mut out = Vec::new();
    idle.read_to_end(&mut out).await.unwrap();
    assert_eq!(RawResponse::parse(&out).status(), 200);

    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), waiting.read_to_end(&mut out))
        .await
        .expect("second connection never served")
        .unwrap();
    assert_eq!(RawResponse::parse(&out).status(), 200);
}

#[tokio::test]
async fn test_non_reading_client_releases_worker() {
    let dir = site("server-stalled");
    dir.write("big.txt", &vec![b'x'; 32 * 1024 * 1024]);
    let mut cfg = test_config(dir.path());
    cfg.server.workers = 1;
    cfg.server.read_timeout_ms = 100;
    cfg.server.write_timeout_ms = 100;
    let addr = start(cfg).await;

    // Requests a file far larger than the socket buffers, then never reads.
    let mut stalled = TcpStream::connect(addr).await.unwrap();
    stalled
        .write_all(b"GET /big.txt HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /index.html HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
        .await
        .expect("worker still held by a client that stopped reading")
        .unwrap();

    let resp = RawResponse::parse(&out);
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body, INDEX_HTML);
    drop(stalled);
}

#[tokio::test]
async fn test_bind_fails_for_missing_docroot() {
    let dir = ScratchDir::new("server-nodocroot");
    let cfg = test_config(&dir.path().join("absent"));

    assert!(Listener::bind(&cfg).await.is_err());
}
