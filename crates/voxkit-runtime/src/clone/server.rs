//! Long-lived XTTS inference server speaking JSON lines over stdio.
//!
//! # Protocol
//!
//! One request per line on the server's stdin:
//!
//! ```json
//! {"action":"synthesize","text":"Hi","speaker_wav":"/v/reference.wav","language":"en",
//!  "output_path":"/tmp/out.wav","temperature":0.65,"top_k":50,"top_p":0.85,
//!  "repetition_penalty":2.0,"speed":1.0}
//! ```
//!
//! One result per line on stdout:
//!
//! ```json
//! {"success": true}
//! {"success": false, "error": "CUDA out of memory"}
//! ```
//!
//! Lines on stdout that are not JSON objects are treated as server logging.
//! The process is started on first use and reused; requests are serialized.
//! A request whose caller went away before the reply arrived leaves the
//! stream out of step, so that process is replaced before the next request.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cleanup::remove_quietly;
use crate::error::{CloneError, ToolError};
use crate::shutdown::shutdown_child;

const SERVER_TOOL: &str = "XTTS server";

/// Sampling parameters for XTTS synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XttsOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub speed: f32,
}

impl Default for XttsOptions {
    fn default() -> Self {
        Self {
            temperature: 0.65,
            top_k: 50,
            top_p: 0.85,
            repetition_penalty: 2.0,
            speed: 1.0,
        }
    }
}

/// A single synthesis request line.
#[derive(Debug, Clone, Serialize)]
pub struct XttsRequest<'a> {
    pub action: &'static str,
    pub text: &'a str,
    pub speaker_wav: &'a Path,
    pub language: &'a str,
    pub output_path: &'a Path,
    #[serde(flatten)]
    pub options: XttsOptions,
}

impl<'a> XttsRequest<'a> {
    pub const fn synthesize(
        text: &'a str,
        speaker_wav: &'a Path,
        language: &'a str,
        output_path: &'a Path,
        options: XttsOptions,
    ) -> Self {
        Self {
            action: "synthesize",
            text,
            speaker_wav,
            language,
            output_path,
            options,
        }
    }
}

#[derive(Debug, Deserialize)]
struct XttsResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// How to start the server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XttsServerConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

struct ServerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    /// Output path of a request that was sent but whose reply is unread.
    in_flight: Option<PathBuf>,
}

impl ServerProcess {
    async fn stop(self) {
        let Self {
            child,
            stdin,
            in_flight,
            ..
        } = self;
        // Closing stdin lets a well-behaved server exit on its own
        drop(stdin);
        match shutdown_child(child).await {
            Ok(status) => info!(%status, "XTTS server stopped"),
            Err(e) => warn!(error = %e, "Failed to stop XTTS server"),
        }
        if let Some(output) = in_flight {
            remove_quietly(&output).await;
        }
    }
}

/// Handle to the (lazily started) inference server.
pub struct XttsServer {
    config: XttsServerConfig,
    process: Mutex<Option<ServerProcess>>,
}

impl std::fmt::Debug for XttsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XttsServer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl XttsServer {
    pub fn new(config: XttsServerConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
        }
    }

    pub const fn config(&self) -> &XttsServerConfig {
        &self.config
    }

    /// Whether a server process is currently running.
    pub async fn is_running(&self) -> bool {
        let mut guard = self.process.lock().await;
        match guard.as_mut() {
            Some(process) => matches!(process.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Send one request and wait for its result line.
    ///
    /// If the server dies mid-request it is discarded and restarted on the
    /// next call.
    pub async fn synthesize(&self, request: &XttsRequest<'_>) -> Result<(), CloneError> {
        let mut guard = self.process.lock().await;

        if guard.as_ref().is_some_and(|p| p.in_flight.is_some()) {
            if let Some(stale) = guard.take() {
                warn!("Previous XTTS request was abandoned, restarting server");
                stale.stop().await;
            }
        }

        let alive = match guard.as_mut() {
            Some(process) => matches!(process.child.try_wait(), Ok(None)),
            None => false,
        };
        if !alive {
            if guard.take().is_some() {
                warn!("XTTS server had exited, restarting");
            }
            *guard = Some(self.spawn()?);
        }
        let Some(process) = guard.as_mut() else {
            return Err(CloneError::ServerExited);
        };

        let mut line = serde_json::to_string(request)
            .map_err(|e| CloneError::Protocol(format!("failed to encode request: {e}")))?;
        line.push('\n');

        process.in_flight = Some(request.output_path.to_path_buf());
        let exchange = async {
            process.stdin.write_all(line.as_bytes()).await?;
            process.stdin.flush().await?;
            loop {
                let Some(reply) = process.stdout.next_line().await? else {
                    return Ok(None);
                };
                let reply = reply.trim();
                if !reply.starts_with('{') {
                    if !reply.is_empty() {
                        debug!(target: "xtts", "{reply}");
                    }
                    continue;
                }
                return Ok::<_, std::io::Error>(Some(reply.to_string()));
            }
        }
        .await;

        let reply = match exchange {
            Ok(Some(reply)) => {
                process.in_flight = None;
                reply
            }
            Ok(None) | Err(_) => {
                // Broken pipe or EOF: the server is gone
                *guard = None;
                return Err(CloneError::ServerExited);
            }
        };

        let response: XttsResponse = serde_json::from_str(&reply)
            .map_err(|e| CloneError::Protocol(format!("{e}: {reply}")))?;

        if response.success {
            Ok(())
        } else {
            Err(CloneError::Synthesis(
                response
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    /// Stop the server if it is running.
    pub async fn shutdown(&self) {
        let process = self.process.lock().await.take();
        if let Some(process) = process {
            process.stop().await;
        }
    }

    fn spawn(&self) -> Result<ServerProcess, CloneError> {
        info!(program = %self.config.program.display(), "Starting XTTS server");
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::from_spawn(SERVER_TOOL, e))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(CloneError::Protocol("server stdio not captured".to_string()));
        };

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "xtts", "{line}");
                }
            });
        }

        Ok(ServerProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            in_flight: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_flat() {
        let request = XttsRequest::synthesize(
            "Hello",
            Path::new("/v/reference.wav"),
            "en",
            Path::new("/tmp/out.wav"),
            XttsOptions::default(),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["action"], "synthesize");
        assert_eq!(value["speaker_wav"], "/v/reference.wav");
        assert_eq!(value["top_k"], 50);
        assert_eq!(value["repetition_penalty"], 2.0);
        assert!(!serde_json::to_string(&request).unwrap().contains('\n'));
    }

    #[tokio::test]
    async fn missing_program_is_tool_not_found() {
        let server = XttsServer::new(XttsServerConfig {
            program: PathBuf::from("/nonexistent/voxkit/python3"),
            args: Vec::new(),
        });
        let request = XttsRequest::synthesize(
            "Hello",
            Path::new("/v/reference.wav"),
            "en",
            Path::new("/tmp/out.wav"),
            XttsOptions::default(),
        );
        let err = server.synthesize(&request).await.unwrap_err();
        assert!(matches!(err, CloneError::Tool(e) if e.is_not_found()));
    }
}
