//! Infrastructure layer for Switchyard.
//!
//! Contains the pieces that touch the outside world or make random choices:
//! TOML configuration loading, the `rand`-backed fault source, and the
//! concrete components the binary deploys (event worker, deployment probe).

pub mod component;
pub mod config;
pub mod fault;
