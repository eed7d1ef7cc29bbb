//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use least_conn_lb::config::BalancerConfig;
use least_conn_lb::load_balancer::ServerPool;
use least_conn_lb::{HttpServer, Shutdown};

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request path and returns the status code and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A backend whose `/health` status can be changed while it runs.
///
/// Any other path answers 200 with `name` followed by the path.
pub async fn start_switchable_backend(name: &'static str, health: Arc<AtomicU16>) -> SocketAddr {
    start_programmable_backend(move |path| {
        let health = health.clone();
        async move {
            if path == "/health" {
                (health.load(Ordering::SeqCst), "OK".into())
            } else {
                (200, format!("{} {}", name, path))
            }
        }
    })
    .await
}

/// A healthy backend answering `name <path>` on every non-health path.
pub async fn start_healthy_backend(name: &'static str) -> SocketAddr {
    start_switchable_backend(name, Arc::new(AtomicU16::new(200))).await
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// Start the balancer on an ephemeral port.
pub async fn start_balancer(config: BalancerConfig) -> (SocketAddr, Arc<ServerPool>, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let pool = server.pool();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, pool, shutdown)
}

/// Poll until the pool's health flags equal `expected`.
pub async fn wait_for_health(pool: &ServerPool, expected: &[bool]) {
    for _ in 0..100 {
        let flags: Vec<bool> = pool.snapshot().await.iter().map(|s| s.is_healthy()).collect();
        if flags == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("pool never reached health {:?}", expected);
}

pub async fn total_connections(pool: &ServerPool) -> usize {
    pool.snapshot().await.iter().map(|s| s.active_connections()).sum()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
