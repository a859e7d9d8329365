//! Event worker component.
//!
//! Consumes one bus address. Its start may fail (decided by a start
//! [`FaultInjector`]); each message is either echoed back as the reply body
//! or failed with `(1, "Random Failure")`, decided by a message injector.
//! With a reply delay the answer is sent from a spawned task, so the
//! mailbox keeps draining while replies are pending.

use std::sync::Arc;
use std::time::Duration;

use switchyard_core::fault::{FaultInjector, NeverFail};
use switchyard_core::lifecycle::{Component, Registrar};
use switchyard_core::message::{Consumer, Message};
use switchyard_types::address::Address;
use switchyard_types::config::EventConfig;
use switchyard_types::error::AddressError;
use switchyard_types::lifecycle::StartOutcome;
use switchyard_types::message::Outcome;
use tracing::{debug, info};

use crate::fault::fault_from_rate;

pub const RANDOM_FAILURE_CODE: i32 = 1;
pub const RANDOM_FAILURE_MESSAGE: &str = "Random Failure";

const START_FAILURE_REASON: &str = "random deployment failure of event component";

pub struct EventComponent {
    address: Address,
    start_faults: Arc<dyn FaultInjector>,
    message_faults: Arc<dyn FaultInjector>,
    reply_delay: Duration,
}

impl EventComponent {
    /// A worker on `address` that never fails and replies immediately.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            start_faults: Arc::new(NeverFail),
            message_faults: Arc::new(NeverFail),
            reply_delay: Duration::ZERO,
        }
    }

    /// Build from the `[event]` config section with random fault sources.
    pub fn from_config(config: &EventConfig) -> Result<Self, AddressError> {
        let address = Address::new(config.address.clone())?;
        Ok(Self::new(address)
            .with_start_faults(fault_from_rate(config.start_failure_rate))
            .with_message_faults(fault_from_rate(config.message_failure_rate))
            .with_reply_delay(Duration::from_millis(config.reply_delay_ms)))
    }

    pub fn with_start_faults(mut self, faults: Arc<dyn FaultInjector>) -> Self {
        self.start_faults = faults;
        self
    }

    pub fn with_message_faults(mut self, faults: Arc<dyn FaultInjector>) -> Self {
        self.message_faults = faults;
        self
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl Component for EventComponent {
    fn name(&self) -> &str {
        "event"
    }

    async fn start(&self, registrar: &mut Registrar) -> StartOutcome {
        registrar.register(
            self.address.clone(),
            EventConsumer {
                faults: Arc::clone(&self.message_faults),
                reply_delay: self.reply_delay,
            },
        );

        if self.start_faults.should_fail() {
            return StartOutcome::failed(START_FAILURE_REASON);
        }

        info!(address = %self.address, deployment_id = %registrar.deployment_id(), "event worker ready");
        StartOutcome::Started
    }
}

/// Bus consumer installed by [`EventComponent`].
pub struct EventConsumer {
    faults: Arc<dyn FaultInjector>,
    reply_delay: Duration,
}

impl EventConsumer {
    fn decide(&self, message: &Message) -> Outcome {
        if self.faults.should_fail() {
            Outcome::failure(RANDOM_FAILURE_CODE, RANDOM_FAILURE_MESSAGE)
        } else {
            Outcome::Success(message.body().clone())
        }
    }
}

impl Consumer for EventConsumer {
    async fn handle(&self, message: Message) -> Option<Outcome> {
        debug!(
            address = %message.address(),
            correlation_id = %message.correlation(),
            path = message.body().get_str("path").unwrap_or_default(),
            "event received"
        );

        let outcome = self.decide(&message);
        if self.reply_delay.is_zero() {
            return Some(outcome);
        }

        let delay = self.reply_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Caller may have gone away; nothing to do then.
            let _ = message.resolve(outcome);
        });
        None
    }
}
