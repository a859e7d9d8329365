//! Concrete components deployed by the `syard` binary.
//!
//! - `event` -- worker consuming the event address, with injectable start and
//!   per-message failures
//! - `probe` -- records which worker thread ran its deployment

pub mod event;
pub mod probe;

pub use event::{EventComponent, EventConsumer, RANDOM_FAILURE_CODE, RANDOM_FAILURE_MESSAGE};
pub use probe::ProbeComponent;
