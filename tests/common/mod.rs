#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use proxify_probe::{LocalStorage, Settings};

/// Recorded in place of a request head when a client opens TLS directly.
pub const TLS_HANDSHAKE: &str = "<tls handshake>";

/// A minimal forward proxy that records what reaches it.
///
/// Plain requests are answered with `body`; CONNECT tunnels are refused with
/// 403 so the client fails right after the proxy has seen the target.
pub struct FakeProxy {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FakeProxy {
    pub async fn start(body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => n,
                    };
                    head.extend_from_slice(&buf[..n]);
                    if head.first() == Some(&0x16) || head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                if head.first() == Some(&0x16) {
                    log.lock().unwrap().push(TLS_HANDSHAKE.to_string());
                    continue;
                }

                let head = String::from_utf8_lossy(&head).into_owned();
                let reply = if head.starts_with("CONNECT") {
                    "HTTP/1.1 403 Forbidden\r\ncontent-length: 0\r\n\r\n".to_string()
                } else {
                    format!(
                        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                };
                log.lock().unwrap().push(head);
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { addr, seen }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Request heads (or `TLS_HANDSHAKE`) in arrival order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

/// PEM certificate and PKCS#8 key for a throwaway self-signed identity.
pub fn self_signed_pair() -> (String, String) {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    (certified.cert.pem(), certified.key_pair.serialize_pem())
}

/// Temp directory storage plus settings that never touch the real proxy.
pub fn workspace() -> (TempDir, LocalStorage, Settings) {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let mut settings = Settings::default();
    settings.endpoints.proxy_url = None;
    (temp_dir, storage, settings)
}

pub fn write(temp_dir: &TempDir, name: &str, contents: &str) {
    std::fs::write(temp_dir.path().join(name), contents).unwrap();
}
