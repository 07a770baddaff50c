//! dbx Core - Shared types for dbx database connectors.
//!
//! This crate provides the pieces every connector plugin agrees on:
//! - The error taxonomy and its wire response format.
//! - The connection status machine that drives UI affordances.
//! - Dotted state-path names used by the host to address connector state.
//! - Connector descriptors (key, display name, editor syntax).

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod connector;
mod error;
mod path;
mod status;

pub use connector::*;
pub use error::*;
pub use path::*;
pub use status::*;

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
