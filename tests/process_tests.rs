//! Process-level tests against the built binary.
//!
//! Each test starts its own server on a free port, talks to it over plain
//! TCP and inspects how the process exits.
//!
//! Run with: cargo test --test process_tests
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const BINARY: &str = env!("CARGO_BIN_EXE_podecho");

/// Manages one server process
struct ServerProcess {
    process: Child,
    port: u16,
}

impl ServerProcess {
    /// Start the server with extra environment variables and wait for it to listen
    fn start(extra_env: &[(&str, &str)]) -> Self {
        let port = free_port();
        let mut command = Command::new(BINARY);
        command
            .env("PORT", port.to_string())
            .env("LISTEN_HOST", "127.0.0.1")
            .env("APP_CONTEXT", "/")
            .env("PODINFO_DIR", "/nonexistent/podecho-test")
            .env("RUST_LOG", "podecho=warn")
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        for (key, value) in extra_env {
            command.env(key, value);
        }

        let process = command.spawn().expect("Failed to start server");
        let server = Self { process, port };
        server.wait_for_ready();
        server
    }

    fn is_running(&self) -> bool {
        TcpStream::connect(("127.0.0.1", self.port)).is_ok()
    }

    fn wait_for_ready(&self) {
        let max_attempts = 100;
        let delay = Duration::from_millis(100);

        for _ in 0..max_attempts {
            if self.is_running() {
                return;
            }
            std::thread::sleep(delay);
        }
        panic!(
            "Server did not start within {} seconds",
            max_attempts as f64 * delay.as_secs_f64()
        );
    }

    /// Send a GET request and return the raw response, if any
    fn get(&self, path: &str) -> String {
        let mut stream =
            TcpStream::connect(("127.0.0.1", self.port)).expect("Failed to connect to server");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        write!(
            stream,
            "GET {} HTTP/1.1\r\nHost: podecho.test\r\nConnection: close\r\n\r\n",
            path
        )
        .unwrap();

        let mut response = String::new();
        // A killed process may reset the connection; whatever arrived is returned
        let _ = stream.read_to_string(&mut response);
        response
    }

    fn wait_for_exit(&mut self, timeout: Duration) -> ExitStatus {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.process.try_wait().unwrap() {
                return status;
            }
            if Instant::now() > deadline {
                panic!("Server did not exit within {:?}", timeout);
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn test_health_over_tcp() {
    let server = ServerProcess::start(&[]);
    let response = server.get("/healthz");

    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains(r#"{"health":"ok","Version":""#));
}

#[test]
fn test_echo_over_tcp() {
    let server = ServerProcess::start(&[("MY_POD_NAME", "web-0")]);

    let first = server.get("/hello");
    assert!(first.contains("\r\n\r\n0 GET /hello\n"), "{}", first);
    assert!(first.contains("Host: podecho.test\n"));
    assert!(first.contains("ENV MY_POD_NAME = web-0\n"));
    assert!(first.contains("ENV MY_NODE_NAME = empty\n"));
    assert!(!first.contains("FILE "));

    let second = server.get("/hello");
    assert!(second.contains("\r\n\r\n1 GET /hello\n"), "{}", second);
}

#[test]
fn test_shutdown_exits_with_success() {
    let mut server = ServerProcess::start(&[]);
    let _ = server.get("/shutdown");

    let status = server.wait_for_exit(Duration::from_secs(10));
    assert_eq!(status.code(), Some(0));
}

#[test]
fn test_bind_failure_is_fatal() {
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();

    let output = Command::new(BINARY)
        .env("PORT", port.to_string())
        .env("LISTEN_HOST", "127.0.0.1")
        .env("PODINFO_DIR", "/nonexistent/podecho-test")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run server");

    assert!(!output.status.success());
    drop(occupied);
}

#[test]
fn test_invalid_config_is_fatal() {
    let output = Command::new(BINARY)
        .env("PORT", "not-a-port")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run server");

    assert!(!output.status.success());
}
