//! Connection status machine.
//!
//! ```text
//! ┌──────────────┐  connect   ┌────────────┐  introspected  ┌───────────┐
//! │ Disconnected │ ─────────► │ Connecting │ ─────────────► │ Connected │
//! └──────────────┘            └────────────┘                └───────────┘
//!        ▲                          │ failure                     │
//!        └──────────────────────────┴─────────────────────────────┘
//!                                      disconnect
//! ```
//!
//! The status drives UI affordances only; it does not guard concurrent
//! operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection status of a connector session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No client is bound.
    #[default]
    Disconnected,

    /// A connect attempt is in flight.
    Connecting,

    /// A client is bound and the schema has been fetched.
    Connected,
}

impl ConnectionStatus {
    /// Check if a client is bound.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Credential inputs are read-only while connecting or connected.
    #[must_use]
    pub const fn locks_credentials(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }

    /// Check if the connect action is available.
    #[must_use]
    pub const fn can_connect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }

    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }

    /// Record a move to `to`.
    #[must_use]
    pub fn transition(self, to: Self) -> StatusTransition {
        StatusTransition::new(self, to)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Previous status.
    pub from: ConnectionStatus,

    /// New status.
    pub to: ConnectionStatus,

    /// When the change happened.
    pub timestamp: DateTime<Utc>,
}

impl StatusTransition {
    /// Create a new transition stamped with the current time.
    #[must_use]
    pub fn new(from: ConnectionStatus, to: ConnectionStatus) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
        }
    }
}
