//! Test helpers shared by the workspace's integration tests.
//!
//! - [`RecordingTransport`]: scripted upstream answers, every request recorded.
//! - [`MockUpstream`]: an in-process axum server standing in for the Everhour API.
//! - [`McpStdioSession`]: a newline-delimited JSON-RPC client for the server binary.

mod recording;
mod stdio;
mod upstream;

pub use recording::RecordingTransport;
pub use stdio::McpStdioSession;
pub use upstream::MockUpstream;
