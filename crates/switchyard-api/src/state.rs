//! Application state wiring the bus, lifecycle manager and dispatcher.
//!
//! One `Diagnostics` context is created here and threaded through the bus,
//! the manager and every component.

use std::sync::Arc;

use anyhow::Context;
use switchyard_core::diagnostics::Diagnostics;
use switchyard_core::lifecycle::{Component, ComponentManager};
use switchyard_core::message::MessageBus;
use switchyard_core::route::RouteDispatcher;
use switchyard_infra::component::{EventComponent, ProbeComponent};
use switchyard_types::address::Address;
use switchyard_types::config::SwitchyardConfig;
use tracing::{info, warn};

use crate::http::handlers::build_dispatcher;

/// Shared application state used by the CLI commands and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SwitchyardConfig>,
    pub diagnostics: Diagnostics,
    pub manager: Arc<ComponentManager>,
    pub dispatcher: Arc<RouteDispatcher>,
}

impl AppState {
    /// Wire the bus, manager and route table. Deploys nothing.
    pub fn new(config: SwitchyardConfig) -> anyhow::Result<Self> {
        let event_address = Address::new(config.event.address.clone())
            .context("invalid [event] address")?;

        let diagnostics = Diagnostics::new();
        let bus = Arc::new(MessageBus::new(diagnostics.clone()));
        let manager = Arc::new(ComponentManager::new(Arc::clone(&bus)));
        let dispatcher = build_dispatcher(Arc::clone(&bus), event_address)
            .context("failed to build route table")?;

        Ok(Self {
            config: Arc::new(config),
            diagnostics,
            manager,
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Wire everything and deploy the configured components.
    pub async fn init(config: SwitchyardConfig) -> anyhow::Result<Self> {
        let state = Self::new(config)?;
        let event = EventComponent::from_config(&state.config.event)
            .context("invalid [event] address")?;

        state.deploy(event).await;
        state.deploy(ProbeComponent).await;
        state.log_deployments();
        Ok(state)
    }

    /// Deploy `component`, logging a start failure instead of propagating it.
    ///
    /// A failed component leaves the rest of the application running; routes
    /// targeting its addresses answer with "no consumer registered".
    pub async fn deploy<C: Component>(&self, component: C) -> bool {
        match self.manager.deploy(component).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "component deployment failed");
                false
            }
        }
    }

    fn log_deployments(&self) {
        for deployment in self.manager.deployments() {
            info!(
                component = %deployment.name,
                deployment_id = %deployment.id,
                state = %deployment.state,
                addresses = deployment.addresses.len(),
                "deployment"
            );
        }
    }
}
