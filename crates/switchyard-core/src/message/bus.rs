//! In-process message bus with address-based publish and request-reply.
//!
//! Every registered consumer gets an unbounded `mpsc` mailbox drained by its
//! own task, which gives FIFO delivery per address and guarantees that no
//! consumer code runs inside `publish`/`send_with_reply` itself. Request-reply
//! uses a `oneshot` per message; see [`super::reply`] for the at-most-once
//! rules.
//!
//! A consumer that panics fails the message it was handling with
//! `CONSUMER_PANICKED`; its mailbox task keeps draining.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use switchyard_types::address::Address;
use switchyard_types::body::Body;
use switchyard_types::message::{CorrelationId, Envelope, Outcome};
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use super::handler::Consumer;
use super::registry::{AddressRegistry, ConsumerHandle, ConsumerId};
use super::reply::{Message, ReplyHandle};
use crate::diagnostics::Diagnostics;

/// Central message bus.
///
/// Provides two delivery modes:
/// - **Publish:** fire-and-forget; silently dropped when nobody consumes the address.
/// - **Send with reply:** exactly one [`Outcome`] per send, `NO_HANDLER` failure
///   when nobody consumes the address.
pub struct MessageBus {
    registry: AddressRegistry,
    diagnostics: Diagnostics,
}

impl MessageBus {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            registry: AddressRegistry::new(),
            diagnostics,
        }
    }

    /// Bind `consumer` to `address`, replacing any current consumer.
    ///
    /// Spawns the consumer's mailbox task, so this must be called from within
    /// a tokio runtime.
    pub fn register<C: Consumer>(&self, address: Address, consumer: C) -> ConsumerId {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConsumerId::new();

        tokio::spawn(run_consumer(
            address.clone(),
            id,
            consumer,
            rx,
            self.diagnostics.clone(),
        ));

        match self
            .registry
            .insert(address.clone(), ConsumerHandle::new(id, tx))
        {
            Some(replaced) => {
                debug!(%address, consumer_id = %id, replaced = %replaced, "replaced consumer")
            }
            None => debug!(%address, consumer_id = %id, "registered consumer"),
        }
        id
    }

    /// Remove the consumer at `address`. Returns `true` if one was bound.
    pub fn unregister(&self, address: &Address) -> bool {
        let removed = self.registry.unregister(address);
        if removed {
            debug!(%address, "unregistered consumer");
        }
        removed
    }

    /// Remove the consumer at `address` only if it is still `id`.
    pub fn unregister_consumer(&self, address: &Address, id: ConsumerId) -> bool {
        let removed = self.registry.unregister_consumer(address, id);
        if removed {
            debug!(%address, consumer_id = %id, "unregistered consumer");
        }
        removed
    }

    pub fn lookup(&self, address: &Address) -> Option<ConsumerId> {
        self.registry.lookup(address)
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.registry.lookup(address).is_some()
    }

    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Fire-and-forget delivery.
    ///
    /// With no consumer at `address` the message is dropped. That is the
    /// documented contract for publish, not an error.
    pub fn publish(&self, address: &Address, body: Body) {
        let envelope = Envelope::new(address.clone(), body);
        let correlation = envelope.correlation();

        let Some(consumer) = self.registry.handle(address) else {
            self.diagnostics.record_dropped_publish();
            debug!(%address, correlation_id = %correlation, "no consumer, publish dropped");
            return;
        };

        if consumer.deliver(Message::publication(envelope)).is_err() {
            self.forget_closed(address, consumer.id());
            self.diagnostics.record_dropped_publish();
            return;
        }
        trace!(%address, correlation_id = %correlation, "published");
    }

    /// Request-reply delivery. Never blocks; await the handle for the outcome.
    pub fn send_with_reply(&self, address: &Address, body: Body) -> ReplyHandle {
        let envelope = Envelope::new(address.clone(), body);
        let correlation = envelope.correlation();

        let Some(consumer) = self.registry.handle(address) else {
            debug!(%address, correlation_id = %correlation, "no consumer, failing request");
            return ReplyHandle::resolved(correlation, Outcome::no_handler());
        };

        let (message, handle) = Message::request(envelope, self.diagnostics.clone());
        if let Err(undelivered) = consumer.deliver(message) {
            self.forget_closed(address, consumer.id());
            let _ = undelivered.resolve(Outcome::no_handler());
            return handle;
        }

        trace!(%address, correlation_id = %correlation, "sent request");
        handle
    }

    /// Callback form of [`send_with_reply`](Self::send_with_reply).
    ///
    /// `on_complete` runs on its own task: always after this call returns and
    /// after the consumer answers. It runs even if the caller has moved on.
    pub fn send_with_reply_then<F>(&self, address: &Address, body: Body, on_complete: F) -> CorrelationId
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let handle = self.send_with_reply(address, body);
        let correlation = handle.correlation();
        tokio::spawn(async move {
            on_complete(handle.await);
        });
        correlation
    }

    /// Drop a registration whose consumer task has exited.
    fn forget_closed(&self, address: &Address, id: ConsumerId) {
        self.registry.unregister_consumer(address, id);
        warn!(%address, consumer_id = %id, "consumer mailbox closed, registration removed");
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("registered_addresses", &self.registry.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

/// Drain one consumer's mailbox, one message at a time.
async fn run_consumer<C: Consumer>(
    address: Address,
    id: ConsumerId,
    consumer: C,
    mut mailbox: mpsc::UnboundedReceiver<Message>,
    diagnostics: Diagnostics,
) {
    while let Some(message) = mailbox.recv().await {
        match AssertUnwindSafe(consumer.handle(message.clone()))
            .catch_unwind()
            .await
        {
            Ok(Some(outcome)) => {
                if message.expects_reply() {
                    let _ = message.resolve(outcome);
                }
            }
            Ok(None) => {}
            Err(_) => {
                diagnostics.record_consumer_panic();
                error!(
                    %address,
                    consumer_id = %id,
                    correlation_id = %message.correlation(),
                    sent_at = %message.envelope().created_at(),
                    "consumer panicked while handling message"
                );
                message.resolve_if_pending(Outcome::consumer_panicked());
            }
        }
    }
    debug!(%address, consumer_id = %id, "consumer mailbox closed");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
