use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::driver::PageDriver;
use crate::error::SessionError;

const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

/// How to start the browser driver and how long to wait on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub node_binary: String,
    pub driver_script: String,
    pub headless: bool,
    /// Playwright load state to wait for after navigation.
    pub wait_until: String,
    pub navigate_timeout_ms: u64,
    pub extract_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node_binary: "node".to_string(),
            driver_script: "node/dom-extraction/browser_server.js".to_string(),
            headless: true,
            wait_until: "networkidle".to_string(),
            navigate_timeout_ms: 30_000,
            extract_timeout_ms: 30_000,
        }
    }
}

/// Request sent to the driver over stdin (one JSON line).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverRequest {
    pub id: u64,
    pub cmd: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl DriverRequest {
    fn bare(id: u64, cmd: &'static str) -> Self {
        DriverRequest {
            id,
            cmd,
            url: None,
            wait_until: None,
            timeout_ms: None,
        }
    }

    pub fn navigate(id: u64, url: &str, wait_until: &str, timeout_ms: u64) -> Self {
        DriverRequest {
            url: Some(url.to_string()),
            wait_until: Some(wait_until.to_string()),
            timeout_ms: Some(timeout_ms),
            ..Self::bare(id, "navigate")
        }
    }

    pub fn extract(id: u64) -> Self {
        Self::bare(id, "extract")
    }

    pub fn quit(id: u64) -> Self {
        Self::bare(id, "quit")
    }
}

/// Response read from the driver's stdout (one JSON line).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverResponse {
    #[serde(default)]
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

impl DriverResponse {
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        serde_json::from_str(line.trim()).map_err(|e| SessionError::JsonParse {
            context: "browser driver response".into(),
            source: e,
        })
    }
}

/// A persistent browser session backed by a Node.js driver process.
///
/// The driver keeps one Chromium page open. Requests go out as NDJSON on
/// stdin; responses are read on a background thread so every request can
/// be awaited with a deadline. Responses carrying a stale id (answers to a
/// request that already timed out) are skipped.
#[derive(Debug)]
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    responses: Receiver<String>,
    next_id: u64,
    config: BrowserConfig,
    current_url: Option<String>,
    closed: bool,
}

impl BrowserSession {
    /// Spawn the driver and wait for its ready signal.
    pub fn launch(config: &BrowserConfig) -> Result<Self, SessionError> {
        let mode = if config.headless { "--headless" } else { "--headed" };
        let mut child = Command::new(&config.node_binary)
            .arg(&config.driver_script)
            .arg(mode)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SessionError::Spawn {
                program: format!("{} {}", config.node_binary, config.driver_script),
                source: e,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(SessionError::NotReady("driver stdio was not captured".into()));
        };

        let (tx, responses) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        if let Some(stderr) = child.stderr.take() {
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    debug!("[driver] {}", line.trim_end());
                }
            });
        }

        let mut session = BrowserSession {
            child,
            stdin,
            responses,
            next_id: 1,
            config: config.clone(),
            current_url: None,
            closed: false,
        };

        let timeout = Duration::from_millis(config.navigate_timeout_ms);
        match session.wait_ready(timeout) {
            Ok(()) => Ok(session),
            Err(e) => {
                session.kill();
                Err(e)
            }
        }
    }

    fn wait_ready(&mut self, timeout: Duration) -> Result<(), SessionError> {
        let deadline = Instant::now() + timeout;
        let line = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.responses.recv_timeout(remaining) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => break line,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(SessionError::NotReady(format!(
                        "no ready signal within {} ms",
                        timeout.as_millis()
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => return Err(SessionError::Closed),
            }
        };

        let response = DriverResponse::parse(&line)?;
        if !response.ok || response.ready != Some(true) {
            return Err(SessionError::NotReady(
                response.error.unwrap_or_else(|| line.trim().to_string()),
            ));
        }
        Ok(())
    }

    /// Send a request and wait up to `timeout` for its response.
    fn send(&mut self, request: &DriverRequest, timeout: Duration) -> Result<DriverResponse, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }

        let json = serde_json::to_string(request).map_err(|e| SessionError::JsonSerialize {
            context: "DriverRequest".into(),
            source: e,
        })?;
        writeln!(self.stdin, "{}", json).map_err(SessionError::Write)?;
        self.stdin.flush().map_err(SessionError::Write)?;

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let line = match self.responses.recv_timeout(remaining) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(SessionError::Timeout {
                        command: request.cmd.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(SessionError::Closed),
            };

            if line.trim().is_empty() {
                continue;
            }
            let response = DriverResponse::parse(&line)?;
            if response.id != Some(request.id) {
                debug!("discarding stale driver response {:?}", response.id);
                continue;
            }
            return Ok(response);
        }
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &DriverRequest, timeout: Duration) -> Result<DriverResponse, SessionError> {
        let response = self.send(request, timeout)?;
        if !response.ok {
            return Err(SessionError::Protocol {
                command: request.cmd.into(),
                error: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Last URL navigated to, as reported by the driver.
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Quit the driver. Best-effort and idempotent: the process is killed if
    /// it does not exit promptly.
    pub fn quit(&mut self) {
        if self.closed {
            return;
        }
        let request = DriverRequest::quit(self.next_id());
        let _ = self.send(&request, QUIT_TIMEOUT);
        self.closed = true;

        let deadline = Instant::now() + QUIT_TIMEOUT;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(25)),
                _ => break,
            }
        }
        warn!("browser driver did not exit, killing it");
        self.kill();
    }

    fn kill(&mut self) {
        self.closed = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl PageDriver for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let timeout_ms = self.config.navigate_timeout_ms;
        let request = DriverRequest::navigate(self.next_id(), url, &self.config.wait_until, timeout_ms);
        let response = self.send_ok(&request, Duration::from_millis(timeout_ms))?;
        self.current_url = Some(response.url.unwrap_or_else(|| url.to_string()));
        Ok(())
    }

    fn extract(&mut self) -> Result<Option<Value>, SessionError> {
        let request = DriverRequest::extract(self.next_id());
        let timeout = Duration::from_millis(self.config.extract_timeout_ms);
        match self.send_ok(&request, timeout) {
            Ok(response) => Ok(Some(response.data.unwrap_or(Value::Null))),
            Err(SessionError::Timeout { timeout_ms, .. }) => {
                warn!(
                    "element extraction timed out after {} ms on {}",
                    timeout_ms,
                    self.current_url.as_deref().unwrap_or("<unknown>")
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) {
        self.quit();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.quit();
    }
}
