#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub struct Server {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Server {
    pub fn spawn(anki_url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = Command::new(env!("CARGO_BIN_EXE_mcp-anki"))
            .args([
                "serve",
                "--stdio",
                "--anki-url",
                anki_url,
                "--max-retries",
                "2",
                "--retry-delay-ms",
                "1",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().expect("stdin available");
        let stdout = BufReader::new(child.stdout.take().expect("stdout available"));
        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    /// Write a request that expects no response.
    pub fn notify(&mut self, request: serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
        let serialized = serde_json::to_string(&request)?;
        writeln!(self.stdin, "{serialized}")?;
        self.stdin.flush()?;
        Ok(())
    }

    pub fn send(
        &mut self,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let serialized = serde_json::to_string(&request)?;
        writeln!(self.stdin, "{serialized}")?;
        self.stdin.flush()?;

        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        let response: serde_json::Value = serde_json::from_str(line.trim())?;
        Ok(response)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    format!("http://127.0.0.1:{port}")
}
