use std::net::SocketAddr;

use async_std::io::{ReadExt, WriteExt};
use async_std::net::{TcpListener, TcpStream};
use async_std::task::{self, JoinHandle};

use crate::util::find_head_end;
use crate::Url;

/// A server accepting exactly one connection.
///
/// Reads one request, answers with the canned bytes and closes.
pub struct TestServer {
    address: SocketAddr,
    handle: JoinHandle<Vec<u8>>,
}

impl TestServer {
    pub async fn start(response: &[u8]) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let response = response.to_vec();

        let handle = task::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(&response).await.unwrap();
            request
        });

        TestServer { address, handle }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn url(&self, path: &str) -> Url {
        Url::from_ip("http", self.address.ip(), self.address.port(), path)
    }

    /// The request as received by the server.
    pub async fn received(self) -> Vec<u8> {
        self.handle.await
    }
}

/// An address nobody listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        if let Some(end) = find_head_end(&buffer) {
            if buffer.len() >= end + content_length(&buffer[..end]) {
                return buffer;
            }
        }

        let n = stream.read(&mut chunk).await.unwrap();

        if n == 0 {
            return buffer;
        }

        buffer.extend_from_slice(&chunk[..n]);
    }
}

fn content_length(head: &[u8]) -> usize {
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    head.split("\r\n")
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
