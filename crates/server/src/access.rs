//! Read-only mode.
//!
//! The gate is built once from configuration and never changes afterwards. In restricted mode a
//! tool runs only if it is classified as a read *and* explicitly declares itself safe for
//! read-only use; any disagreement between the two is treated as unsafe.

use crate::descriptor::{OperationType, ToolDescriptor};
use crate::registry::Registry;
use std::collections::BTreeSet;
use std::fmt;

pub const READONLY_ENV: &str = "EVERHOUR_READONLY_MODE";

/// Truthy forms accepted for boolean environment flags.
#[must_use]
pub fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Restricted,
    Unrestricted,
}

impl AccessMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restricted => "readonly",
            Self::Unrestricted => "full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGate {
    mode: AccessMode,
}

/// Result of [`AccessGate::partition`]. Every tool name is in exactly one set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub allowed: BTreeSet<&'static str>,
    pub blocked: BTreeSet<&'static str>,
}

impl AccessGate {
    #[must_use]
    pub fn new(restricted: bool) -> Self {
        Self {
            mode: if restricted {
                AccessMode::Restricted
            } else {
                AccessMode::Unrestricted
            },
        }
    }

    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.mode == AccessMode::Restricted
    }

    #[must_use]
    pub fn authorize(&self, descriptor: &ToolDescriptor) -> bool {
        match self.mode {
            AccessMode::Unrestricted => true,
            AccessMode::Restricted => {
                descriptor.operation == OperationType::Read && descriptor.readonly
            }
        }
    }

    #[must_use]
    pub fn partition(&self, registry: &Registry) -> Partition {
        let mut out = Partition::default();
        for d in registry.iter() {
            if self.authorize(d) {
                out.allowed.insert(d.name);
            } else {
                out.blocked.insert(d.name);
            }
        }
        out
    }

    /// Explanation returned to the caller when `descriptor` is blocked.
    #[must_use]
    pub fn denial_message(&self, descriptor: &ToolDescriptor) -> String {
        let reason = if descriptor.operation == OperationType::Read {
            "it is not marked as safe for read-only mode"
        } else {
            "only read operations are allowed in read-only mode"
        };
        format!(
            "Tool \"{name}\" is blocked: the Everhour MCP server is running in read-only mode and {reason}.\n\
             Operation: {op}\n\
             Affected resources: {resources}\n\
             To enable write and delete operations, set {READONLY_ENV}=false and restart the server.",
            name = descriptor.name,
            op = descriptor.operation.as_str().to_ascii_uppercase(),
            resources = descriptor.resources.join(", "),
        )
    }

    #[must_use]
    pub fn summary(&self, registry: &Registry) -> AccessSummary {
        let p = self.partition(registry);
        AccessSummary {
            mode: self.mode,
            allowed: p.allowed.len(),
            blocked: p.blocked.len(),
            total: registry.len(),
        }
    }
}

/// Startup log line describing the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSummary {
    pub mode: AccessMode,
    pub allowed: usize,
    pub blocked: usize,
    pub total: usize,
}

impl fmt::Display for AccessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            AccessMode::Restricted => write!(
                f,
                "read-only mode: {} of {} tools allowed, {} blocked (set {READONLY_ENV}=false to allow writes)",
                self.allowed, self.total, self.blocked
            ),
            AccessMode::Unrestricted => write!(
                f,
                "full access mode: all {} tools allowed (set {READONLY_ENV}=true to block writes)",
                self.total
            ),
        }
    }
}
