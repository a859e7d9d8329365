//! Runtime core for Switchyard.
//!
//! Holds the in-process message bus and its address registry, the component
//! lifecycle manager, and the route dispatcher that bridges requests onto the
//! bus. Depends only on `switchyard-types`; no I/O or configuration loading.

pub mod diagnostics;
pub mod fault;
pub mod lifecycle;
pub mod message;
pub mod route;
