//! Component lifecycle: the `Component` capability trait and the manager
//! that starts components and keeps their bus registrations consistent with
//! their start outcome.

pub mod component;
pub mod manager;

pub use component::{Component, Registrar};
pub use manager::{ComponentManager, DeploymentSummary};
