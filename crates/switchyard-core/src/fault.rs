//! Injectable failure decisions.
//!
//! Components that simulate failures ask a [`FaultInjector`] instead of
//! rolling dice themselves. Tests wire a deterministic injector; the binary
//! wires a random one from `switchyard-infra`.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Decides whether the next operation should fail.
pub trait FaultInjector: Send + Sync {
    fn should_fail(&self) -> bool;
}

/// Never injects a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl FaultInjector for NeverFail {
    fn should_fail(&self) -> bool {
        false
    }
}

/// Always injects a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

impl FaultInjector for AlwaysFail {
    fn should_fail(&self) -> bool {
        true
    }
}

/// Replays a fixed sequence of decisions, then never fails.
#[derive(Debug, Default)]
pub struct ScriptedFaults {
    decisions: Mutex<VecDeque<bool>>,
}

impl ScriptedFaults {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
        }
    }
}

impl FaultInjector for ScriptedFaults {
    fn should_fail(&self) -> bool {
        let mut decisions = self
            .decisions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        decisions.pop_front().unwrap_or(false)
    }
}
