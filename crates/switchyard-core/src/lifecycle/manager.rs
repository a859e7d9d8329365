//! Component lifecycle manager.
//!
//! Drives each deployment through `Pending -> Starting -> {Started,
//! StartFailed}`. Consumers a component registers while starting are
//! committed to the bus only on `Started`; on `StartFailed` they are
//! discarded before the failure is reported, so nothing can reach a
//! half-initialized component. Failed starts are terminal and never retried.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use switchyard_types::address::Address;
use switchyard_types::error::LifecycleError;
use switchyard_types::lifecycle::{ComponentState, DeploymentId, StartOutcome};
use tracing::{info, warn};

use super::component::{Component, Registrar};
use crate::diagnostics::Diagnostics;
use crate::message::{ConsumerId, MessageBus};

struct Deployment {
    name: String,
    state: ComponentState,
    addresses: Vec<(Address, ConsumerId)>,
}

/// Supervisor-facing view of one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSummary {
    pub id: DeploymentId,
    pub name: String,
    pub state: ComponentState,
    pub addresses: Vec<Address>,
}

/// Starts components and tracks their lifecycle state.
pub struct ComponentManager {
    bus: Arc<MessageBus>,
    diagnostics: Diagnostics,
    deployments: DashMap<DeploymentId, Deployment>,
}

impl ComponentManager {
    /// Create a manager that installs consumers on `bus`.
    pub fn new(bus: Arc<MessageBus>) -> Self {
        let diagnostics = bus.diagnostics().clone();
        Self {
            bus,
            diagnostics,
            deployments: DashMap::new(),
        }
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Start `component` and report its outcome.
    ///
    /// A start failure is returned as [`LifecycleError::ComponentStartFailed`]
    /// and leaves every other deployment untouched.
    pub async fn deploy<C: Component>(&self, component: C) -> Result<DeploymentId, LifecycleError> {
        let id = DeploymentId::new();
        let name = component.name().to_string();

        self.deployments.insert(
            id,
            Deployment {
                name: name.clone(),
                state: ComponentState::Pending,
                addresses: Vec::new(),
            },
        );
        self.set_state(&id, ComponentState::Starting);
        info!(component = %name, deployment_id = %id, "starting component");

        let mut registrar = Registrar::new(id, self.diagnostics.clone());
        let outcome = component.start(&mut registrar).await;

        match outcome {
            StartOutcome::Started => {
                let addresses = registrar.commit(&self.bus);
                let bound = addresses.len();
                if let Some(mut deployment) = self.deployments.get_mut(&id) {
                    deployment.state = ComponentState::Started;
                    deployment.addresses = addresses;
                }
                info!(component = %name, deployment_id = %id, addresses = bound, "component started");
                Ok(id)
            }
            StartOutcome::StartFailed(reason) => {
                let discarded = registrar.discard();
                self.set_state(&id, ComponentState::StartFailed(reason.clone()));
                self.diagnostics.record_start_failure();
                warn!(
                    component = %name,
                    deployment_id = %id,
                    discarded = discarded.len(),
                    %reason,
                    "component failed to start"
                );
                Err(LifecycleError::ComponentStartFailed {
                    component: name,
                    reason,
                })
            }
        }
    }

    /// Stop a started deployment, unregistering the addresses it still owns.
    ///
    /// Addresses that were re-registered by someone else since are left alone.
    pub fn undeploy(&self, id: DeploymentId) -> Result<(), LifecycleError> {
        let mut deployment = self
            .deployments
            .get_mut(&id)
            .ok_or_else(|| LifecycleError::UnknownDeployment(id.to_string()))?;

        if deployment.state != ComponentState::Started {
            return Err(LifecycleError::NotStarted(id.to_string()));
        }

        let addresses = std::mem::take(&mut deployment.addresses);
        for (address, consumer) in &addresses {
            self.bus.unregister_consumer(address, *consumer);
        }
        deployment.state = ComponentState::Stopped;
        info!(component = %deployment.name, deployment_id = %id, "component stopped");
        Ok(())
    }

    pub fn state(&self, id: DeploymentId) -> Option<ComponentState> {
        self.deployments.get(&id).map(|d| d.state.clone())
    }

    /// All deployments, oldest first.
    pub fn deployments(&self) -> Vec<DeploymentSummary> {
        let mut summaries: Vec<DeploymentSummary> = self
            .deployments
            .iter()
            .map(|entry| DeploymentSummary {
                id: *entry.key(),
                name: entry.name.clone(),
                state: entry.state.clone(),
                addresses: entry.addresses.iter().map(|(a, _)| a.clone()).collect(),
            })
            .collect();
        summaries.sort_by_key(|summary| summary.id);
        summaries
    }

    fn set_state(&self, id: &DeploymentId, state: ComponentState) {
        if let Some(mut deployment) = self.deployments.get_mut(id) {
            deployment.state = state;
        }
    }
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field("deployments", &self.deployments.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::message::{Consumer, Message, consumer_fn};
    use switchyard_types::body::Body;
    use switchyard_types::message::Outcome;

    fn address(name: &str) -> Address {
        Address::new(name).unwrap()
    }

    fn tagged(tag: &'static str) -> impl Consumer {
        consumer_fn(move |_message: Message| async move {
            Some(Outcome::Success(Body::new().with("handler", tag)))
        })
    }

    struct StubComponent {
        name: &'static str,
        addresses: Vec<&'static str>,
        outcome: StartOutcome,
    }

    impl StubComponent {
        fn new(name: &'static str, addresses: Vec<&'static str>, outcome: StartOutcome) -> Self {
            Self {
                name,
                addresses,
                outcome,
            }
        }
    }

    impl Component for StubComponent {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self, registrar: &mut Registrar) -> StartOutcome {
            for name in &self.addresses {
                registrar.register(address(name), tagged(self.name));
            }
            self.outcome.clone()
        }
    }

    struct SlowStarter;

    impl Component for SlowStarter {
        fn name(&self) -> &str {
            "slow"
        }

        async fn start(&self, registrar: &mut Registrar) -> StartOutcome {
            registrar.register(address("slow"), tagged("slow"));
            registrar
                .diagnostics()
                .put(registrar.deployment_id().to_string(), "slow-start");
            tokio::time::sleep(Duration::from_millis(10)).await;
            StartOutcome::Started
        }
    }

    fn make_manager() -> ComponentManager {
        ComponentManager::new(Arc::new(MessageBus::new(Diagnostics::new())))
    }

    #[tokio::test]
    async fn started_component_addresses_are_reachable() {
        let manager = make_manager();
        let id = manager
            .deploy(StubComponent::new("worker", vec!["a", "b"], StartOutcome::Started))
            .await
            .unwrap();

        assert_eq!(manager.state(id), Some(ComponentState::Started));
        assert!(manager.bus().is_registered(&address("a")));
        assert!(manager.bus().is_registered(&address("b")));

        let outcome = manager.bus().send_with_reply(&address("a"), Body::new()).await;
        assert_eq!(outcome, Outcome::Success(Body::new().with("handler", "worker")));
    }

    #[tokio::test]
    async fn failed_component_leaves_no_addresses() {
        let manager = make_manager();
        let result = manager
            .deploy(StubComponent::new(
                "flaky",
                vec!["x", "y"],
                StartOutcome::failed("random deployment failure"),
            ))
            .await;

        assert_eq!(
            result,
            Err(LifecycleError::ComponentStartFailed {
                component: "flaky".to_string(),
                reason: "random deployment failure".to_string(),
            })
        );
        assert!(manager.bus().lookup(&address("x")).is_none());
        assert!(manager.bus().lookup(&address("y")).is_none());
        assert_eq!(manager.bus().diagnostics().start_failures(), 1);

        let outcome = manager.bus().send_with_reply(&address("x"), Body::new()).await;
        assert_eq!(outcome, Outcome::no_handler());
    }

    #[tokio::test]
    async fn failed_component_does_not_disturb_existing_consumer() {
        let manager = make_manager();
        manager
            .deploy(StubComponent::new("owner", vec!["shared"], StartOutcome::Started))
            .await
            .unwrap();
        let owner = manager.bus().lookup(&address("shared"));

        let _ = manager
            .deploy(StubComponent::new(
                "intruder",
                vec!["shared"],
                StartOutcome::failed("nope"),
            ))
            .await;

        assert_eq!(manager.bus().lookup(&address("shared")), owner);
        let outcome = manager.bus().send_with_reply(&address("shared"), Body::new()).await;
        assert_eq!(outcome, Outcome::Success(Body::new().with("handler", "owner")));
    }

    #[tokio::test]
    async fn failure_is_recorded_and_other_components_keep_running() {
        let manager = make_manager();
        let good = manager
            .deploy(StubComponent::new("good", vec!["good"], StartOutcome::Started))
            .await
            .unwrap();
        let _ = manager
            .deploy(StubComponent::new("bad", vec!["bad"], StartOutcome::failed("boom")))
            .await;

        let summaries = manager.deployments();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, good);
        assert_eq!(summaries[0].state, ComponentState::Started);
        assert_eq!(summaries[0].addresses, vec![address("good")]);
        assert_eq!(summaries[1].name, "bad");
        assert_eq!(summaries[1].state, ComponentState::StartFailed("boom".to_string()));
        assert!(summaries[1].addresses.is_empty());

        assert!(manager.bus().send_with_reply(&address("good"), Body::new()).await.is_success());
    }

    #[tokio::test]
    async fn late_start_completion_is_honored() {
        let manager = make_manager();
        let id = manager.deploy(SlowStarter).await.unwrap();

        assert_eq!(manager.state(id), Some(ComponentState::Started));
        assert!(manager.bus().is_registered(&address("slow")));
        assert_eq!(
            manager.bus().diagnostics().get(&id.to_string()).as_deref(),
            Some("slow-start")
        );
    }

    #[tokio::test]
    async fn undeploy_unregisters_owned_addresses() {
        let manager = make_manager();
        let id = manager
            .deploy(StubComponent::new("worker", vec!["a", "b"], StartOutcome::Started))
            .await
            .unwrap();

        // Someone else takes over "b" after the deploy.
        let replacement = manager.bus().register(address("b"), tagged("replacement"));

        manager.undeploy(id).unwrap();
        assert_eq!(manager.state(id), Some(ComponentState::Stopped));
        assert!(!manager.bus().is_registered(&address("a")));
        assert_eq!(manager.bus().lookup(&address("b")), Some(replacement));
    }

    #[tokio::test]
    async fn undeploy_rejects_unknown_and_non_started() {
        let manager = make_manager();
        let unknown = DeploymentId::new();
        assert_eq!(
            manager.undeploy(unknown),
            Err(LifecycleError::UnknownDeployment(unknown.to_string()))
        );

        let id = manager
            .deploy(StubComponent::new("worker", vec![], StartOutcome::Started))
            .await
            .unwrap();
        manager.undeploy(id).unwrap();
        assert_eq!(
            manager.undeploy(id),
            Err(LifecycleError::NotStarted(id.to_string()))
        );
    }
}
