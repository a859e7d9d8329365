//! Component capability trait and the registrar handed to `start`.
//!
//! A component is a named unit with a start procedure. While starting it may
//! register bus consumers through the [`Registrar`]; those registrations are
//! staged and only become reachable once the component reports `Started`.

use std::future::Future;

use switchyard_types::address::Address;
use switchyard_types::lifecycle::{DeploymentId, StartOutcome};
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::message::{Consumer, ConsumerId, MessageBus};

/// A deployable unit with its own start procedure.
///
/// The returned [`StartOutcome`] is the component's explicit completion
/// signal; the manager never infers success on its own. Start may complete
/// late (after timers or other async work) and may decide its outcome
/// nondeterministically.
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    fn start(&self, registrar: &mut Registrar) -> impl Future<Output = StartOutcome> + Send;
}

type Install = Box<dyn FnOnce(&MessageBus) -> ConsumerId + Send>;

struct StagedConsumer {
    address: Address,
    install: Install,
}

/// Collects a starting component's consumer registrations.
pub struct Registrar {
    deployment: DeploymentId,
    diagnostics: Diagnostics,
    staged: Vec<StagedConsumer>,
}

impl Registrar {
    pub(crate) fn new(deployment: DeploymentId, diagnostics: Diagnostics) -> Self {
        Self {
            deployment,
            diagnostics,
            staged: Vec::new(),
        }
    }

    pub fn deployment_id(&self) -> DeploymentId {
        self.deployment
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Stage `consumer` for `address`. It goes live only if the component starts.
    pub fn register<C: Consumer>(&mut self, address: Address, consumer: C) {
        debug!(deployment_id = %self.deployment, %address, "staged consumer");
        let target = address.clone();
        self.staged.push(StagedConsumer {
            address,
            install: Box::new(move |bus: &MessageBus| bus.register(target, consumer)),
        });
    }

    /// Addresses staged so far, in registration order.
    pub fn staged_addresses(&self) -> impl Iterator<Item = &Address> {
        self.staged.iter().map(|staged| &staged.address)
    }

    /// Install every staged consumer on the bus.
    pub(crate) fn commit(self, bus: &MessageBus) -> Vec<(Address, ConsumerId)> {
        self.staged
            .into_iter()
            .map(|staged| {
                let id = (staged.install)(bus);
                (staged.address, id)
            })
            .collect()
    }

    /// Drop every staged consumer, returning the addresses that were never bound.
    pub(crate) fn discard(self) -> Vec<Address> {
        self.staged.into_iter().map(|staged| staged.address).collect()
    }
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("deployment", &self.deployment)
            .field("staged", &self.staged_addresses().collect::<Vec<_>>())
            .finish()
    }
}
