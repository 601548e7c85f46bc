//! Tests against a live listener, where peer addresses reach the rate limiter

use api::rate_limit::RateLimitConfig;
use api::{serve, AppState, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use storage::MemoryRepository;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn start(settings: Settings) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(Arc::new(MemoryRepository::new()), settings);
    tokio::spawn(async move {
        serve(listener, state).await.unwrap();
    });
    addr
}

/// Minimal HTTP/1.1 exchange; returns the status code and the raw response
async fn request(addr: SocketAddr, method: &str, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        method, path, addr
    );
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    (status, response)
}

#[tokio::test]
async fn synthesis_is_rate_limited_per_peer() {
    let settings = Settings {
        rate_limit: RateLimitConfig {
            enabled: true,
            per_second: 60,
            burst_size: 2,
        },
        ..Settings::for_tests()
    };
    let addr = start(settings).await;

    let mut statuses = Vec::new();
    let mut last = String::new();
    for _ in 0..3 {
        let (status, response) = request(addr, "POST", "/api/combinations/synthesize").await;
        statuses.push(status);
        last = response;
    }
    assert_eq!(statuses, vec![200, 200, 429]);
    assert!(last.contains("\"code\":\"RATE_LIMITED\""));
    assert!(last.to_ascii_lowercase().contains("content-type: application/json"));

    let (status, _) = request(addr, "GET", "/api/health").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn disabled_limiter_never_rejects() {
    let addr = start(Settings::for_tests()).await;
    for _ in 0..4 {
        let (status, _) = request(addr, "POST", "/api/combinations/synthesize").await;
        assert_eq!(status, 200);
    }
}
