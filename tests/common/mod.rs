#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Binary under test with an isolated config file and quiet logs
pub fn transcriptor(scratch: &Path, base_url: &str) -> Command {
    let config = scratch.join("config.yaml");
    fs_err::write(&config, format!("provider:\n  base_url: {}\n", base_url)).unwrap();

    let mut cmd = Command::cargo_bin("transcriptor").unwrap();
    cmd.env("TRANSCRIPTOR_CONFIG", &config)
        .env_remove("TRANSCRIPTOR_API_BASE")
        .env_remove("TRANSCRIPTOR_YT_DLP")
        .env_remove("TRANSCRIPTOR_TEMP_DIR")
        .env("RUST_LOG", "off");
    cmd
}

/// Parse stdout, asserting it holds exactly one JSON document
pub fn document(stdout: &[u8]) -> Value {
    let text = std::str::from_utf8(stdout).unwrap();
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    let first = stream.next().expect("no JSON document on stdout").unwrap();
    assert!(stream.next().is_none(), "more than one document on stdout: {}", text);
    first
}

pub fn write_audio(dir: &Path, name: &str, bytes: usize) -> PathBuf {
    let path = dir.join(name);
    fs_err::write(&path, vec![7u8; bytes]).unwrap();
    path
}

/// Nothing listens here, connections are refused
pub const UNREACHABLE: &str = "http://127.0.0.1:9/v1";

/// One-shot HTTP server standing in for the transcription API
pub struct FakeProvider {
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl FakeProvider {
    pub fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);

            let response = format!(
                "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            String::from_utf8_lossy(&request).into_owned()
        });

        Self { base_url, handle }
    }

    /// The raw request received; blocks until it arrived
    pub fn request(self) -> String {
        self.handle.join().unwrap()
    }
}

fn read_request(stream: &mut impl Read) -> Vec<u8> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);
        if request_complete(&request) {
            break;
        }
    }

    request
}

fn request_complete(request: &[u8]) -> bool {
    let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
    let body_len = request.len() - header_end - 4;

    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok());

    match content_length {
        Some(len) => body_len >= len,
        None if headers.contains("transfer-encoding: chunked") => request.ends_with(b"0\r\n\r\n"),
        None => true,
    }
}
