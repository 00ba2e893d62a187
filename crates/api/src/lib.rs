//! Everhour REST access for the MCP server.
//!
//! - [`duration`]: the `"1h 30m 45s"` notation used for time arguments.
//! - [`transport`]: the request/response contract and its reqwest implementation.
//! - [`gateway`]: one method per upstream operation, with error normalization.

pub mod config;
pub mod duration;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod safety;
pub mod transport;

pub use config::{ApiVersion, ClientConfig};
pub use error::{ApiError, Result, UpstreamError};
pub use gateway::Gateway;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
