//! Shared domain types for Switchyard.
//!
//! Addresses, message bodies, envelopes, request-reply outcomes, component
//! lifecycle states, configuration, and the error enums used across the
//! workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod address;
pub mod body;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod message;
