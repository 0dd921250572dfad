//! Shared helpers for `sahayog-data` behaviour tests.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// One-shot HTTP server answering a single request with a canned body.
#[derive(Debug)]
pub struct CannedServer {
    base_url: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    /// Serve `body` with the given status line, e.g. `"200 OK"`.
    pub fn respond(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind canned server");
        let base_url = format!(
            "http://{}",
            listener.local_addr().expect("canned server address")
        );
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept request");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("read request line");
            let mut header = String::new();
            while reader.read_line(&mut header).expect("read header") > 2 {
                header.clear();
            }
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            request_line.trim_end().to_owned()
        });
        Self { base_url, handle }
    }

    /// Base URL clients should call.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait for the request and return its request line.
    pub fn request_line(self) -> String {
        self.handle.join().expect("canned server thread")
    }
}

/// Base URL of a port nothing listens on.
pub fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let address = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{address}")
}
