use anyhow::Context as _;
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Minimal MCP client speaking newline-delimited JSON-RPC over a child's stdio.
///
/// Exists only for integration tests; the child is killed when the session is dropped.
pub struct McpStdioSession {
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl McpStdioSession {
    /// Spawn `command` and complete the `initialize` handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or does not answer `initialize`.
    pub async fn connect(mut command: Command) -> anyhow::Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn MCP server")?;
        let stdin = child.stdin.take().context("child stdin")?;
        let stdout = child.stdout.take().context("child stdout")?;

        let mut session = Self {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        let init = session
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "everhour-mcp-integration-tests", "version": "0" }
                }),
                Duration::from_secs(10),
            )
            .await?;
        anyhow::ensure!(init.get("result").is_some(), "initialize failed: {init}");

        session
            .send(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await?;
        Ok(session)
    }

    async fn send(&mut self, msg: &Value) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(msg)?;
        line.push(b'\n');
        self.stdin.write_all(&line).await.context("write request")?;
        self.stdin.flush().await.context("flush request")?;
        Ok(())
    }

    /// Send one request and wait for the response carrying the same id.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, EOF, or unparsable output.
    pub async fn request(
        &mut self,
        id: u64,
        method: &str,
        params: Value,
        timeout_dur: Duration,
    ) -> anyhow::Result<Value> {
        self.send(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await?;

        tokio::time::timeout(timeout_dur, async {
            loop {
                let line = self
                    .stdout
                    .next_line()
                    .await
                    .context("read response")?
                    .context("server closed stdout")?;
                if line.trim().is_empty() {
                    continue;
                }
                let msg: Value = serde_json::from_str(&line)
                    .with_context(|| format!("non-JSON line on stdout: {line}"))?;
                if msg.get("id") == Some(&json!(id)) {
                    return Ok(msg);
                }
            }
        })
        .await
        .with_context(|| format!("timed out waiting for {method} response"))?
    }

    /// `tools/call` shortcut returning the `result` object.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails at the protocol level.
    pub async fn call_tool(&mut self, id: u64, name: &str, arguments: Value) -> anyhow::Result<Value> {
        let msg = self
            .request(
                id,
                "tools/call",
                json!({"name": name, "arguments": arguments}),
                Duration::from_secs(10),
            )
            .await?;
        msg.get("result")
            .cloned()
            .with_context(|| format!("tools/call {name} returned no result: {msg}"))
    }
}
