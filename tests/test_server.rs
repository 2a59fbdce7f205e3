use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use beacon::config::FamilyPref;
use beacon::index::SearchIndex;
use beacon::router::AppState;
use beacon::server::{self, listener::Listener};

fn state_with_docs() -> (tempfile::TempDir, Arc<AppState>) {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("greeting.txt"), "hello over http").unwrap();

    let index = SearchIndex::build(root.path(), &[PathBuf::from(".")]).unwrap();
    let state = Arc::new(AppState {
        static_dir: root.path().to_path_buf(),
        index,
    });
    (root, state)
}

async fn start_server(state: Arc<AppState>, pool_size: usize) -> SocketAddr {
    let listener = Listener::bind(0, FamilyPref::Ipv4).unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server::run(listener, pool_size, state).await;
    });

    // the listener sits on the wildcard address; clients dial loopback
    SocketAddr::from(([127, 0, 0, 1], addr.port()))
}

/// Reads one complete response: headers through CRLFCRLF, then exactly
/// Content-Length body bytes.
async fn read_response(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before response headers completed");
        buffer.extend_from_slice(&chunk[..n]);
    };

    let headers = String::from_utf8(buffer[..header_end].to_vec()).unwrap();
    let content_length: usize = headers
        .lines()
        .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(str::trim).map(str::to_string))
        .and_then(|v| v.parse().ok())
        .expect("response must carry Content-Length");

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed mid-body");
        body.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(body.len(), content_length);

    (headers, body)
}

#[tokio::test]
async fn test_static_file_end_to_end() {
    let (_root, state) = state_with_docs();
    let addr = start_server(state, 4).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /static/greeting.txt HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (headers, body) = read_response(&mut client).await;
    assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(headers.contains("Content-Type: text/plain\r\n"));
    assert_eq!(body, b"hello over http");
}

#[tokio::test]
async fn test_keep_alive_serves_pipelined_requests_in_order() {
    let (_root, state) = state_with_docs();
    let addr = start_server(state, 4).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(
            b"GET /static/greeting.txt HTTP/1.1\r\nHost: localhost\r\n\r\n\
              GET /query?terms=hello HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )
        .await
        .unwrap();

    let (first_headers, first_body) = read_response(&mut client).await;
    assert!(first_headers.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(first_body, b"hello over http");

    let (second_headers, second_body) = read_response(&mut client).await;
    assert!(second_headers.starts_with("HTTP/1.1 200 OK\r\n"));
    let page = String::from_utf8(second_body).unwrap();
    assert!(page.contains("results found for <b>hello</b>"));
    assert!(page.contains("greeting.txt"));
}

#[tokio::test]
async fn test_connection_close_request_is_never_answered() {
    let (_root, state) = state_with_docs();
    let addr = start_server(state, 4).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /static/greeting.txt HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    // the server drops the closing request and tears the connection down
    let mut buffer = Vec::new();
    let n = client.read_to_end(&mut buffer).await.unwrap();
    assert_eq!(n, 0);
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn test_close_applies_after_earlier_pipelined_requests_are_answered() {
    let (_root, state) = state_with_docs();
    let addr = start_server(state, 4).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(
            b"GET /static/greeting.txt HTTP/1.1\r\nHost: localhost\r\n\r\n\
              GET / HTTP/1.1\r\nConnection: close\r\n\r\n",
        )
        .await
        .unwrap();

    let (headers, body) = read_response(&mut client).await;
    assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"hello over http");

    // the second, closing request gets no response
    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_non_get_request_degrades_to_front_page() {
    let (_root, state) = state_with_docs();
    let addr = start_server(state, 4).await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"POST /static/greeting.txt HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (headers, body) = read_response(&mut client).await;
    assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("<title>beacon</title>"));
}

#[tokio::test]
async fn test_concurrent_clients_are_all_served() {
    let (_root, state) = state_with_docs();
    let addr = start_server(state, 8).await;

    let clients: Vec<_> = (0..8)
        .map(|_| {
            tokio::spawn(async move {
                let mut client = TcpStream::connect(addr).await.unwrap();
                client
                    .write_all(b"GET /static/greeting.txt HTTP/1.1\r\nHost: localhost\r\n\r\n")
                    .await
                    .unwrap();
                let (headers, body) = read_response(&mut client).await;
                assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
                assert_eq!(body, b"hello over http");
            })
        })
        .collect();

    for client in clients {
        client.await.unwrap();
    }
}

#[tokio::test]
async fn test_listener_reports_ephemeral_port() {
    let listener = Listener::bind(0, FamilyPref::Ipv4).unwrap();
    let addr = listener.local_addr().unwrap();

    assert_ne!(addr.port(), 0);
    assert!(addr.ip().is_unspecified());
}

#[tokio::test]
async fn test_dual_stack_bind_succeeds_on_some_family() {
    // dual preference tries IPv6 first and falls back to IPv4; either
    // outcome must produce a usable listener
    let listener = Listener::bind(0, FamilyPref::Dual).unwrap();
    assert_ne!(listener.local_addr().unwrap().port(), 0);
}
