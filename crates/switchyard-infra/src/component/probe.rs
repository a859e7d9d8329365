//! Deployment probe: notes which worker thread ran its start.

use switchyard_core::lifecycle::{Component, Registrar};
use switchyard_types::lifecycle::StartOutcome;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeComponent;

impl Component for ProbeComponent {
    fn name(&self) -> &str {
        "probe"
    }

    async fn start(&self, registrar: &mut Registrar) -> StartOutcome {
        let thread = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        let deployment_id = registrar.deployment_id();
        registrar
            .diagnostics()
            .put(deployment_id.to_string(), thread.clone());
        tracing::info!(%deployment_id, %thread, "probe deployed");
        StartOutcome::Started
    }
}
