//! MCP server exposing Everhour time tracking as tools.
//!
//! Startup builds three immutable values: a [`registry::Registry`] of every tool, an
//! [`access::AccessGate`] fixed from configuration, and an [`everhour_api::Gateway`]. The
//! [`dispatch::Dispatcher`] combines them and [`handler::EverhourServer`] exposes it over MCP.

pub mod access;
pub mod cli;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod registry;
pub mod semantics;
pub mod tools;

pub use access::{AccessGate, AccessMode};
pub use descriptor::{OperationType, ToolDescriptor};
pub use dispatch::Dispatcher;
pub use error::{DispatchError, ServerError, ToolError};
pub use handler::EverhourServer;
pub use registry::Registry;
