//! Consumer trait for bus addresses.
//!
//! A consumer is the single active handler bound to an address. The bus
//! hands it every message delivered to that address, one at a time and in
//! send order. Uses RPITIT (no async_trait) like the other traits in this
//! workspace.

use std::future::Future;

use switchyard_types::message::Outcome;

use super::reply::Message;

/// Handler bound to a bus address.
pub trait Consumer: Send + Sync + 'static {
    /// Handle one delivered message.
    ///
    /// Return `Some(outcome)` to answer directly; the bus resolves the reply
    /// once this future completes. Return `None` to answer later (or never)
    /// through [`Message::reply`] / [`Message::fail`] on a retained clone.
    /// For published messages the return value is ignored.
    ///
    /// The next message for this address is not delivered until the returned
    /// future completes, so long-running work belongs in a spawned task.
    fn handle(&self, message: Message) -> impl Future<Output = Option<Outcome>> + Send;
}

/// [`Consumer`] backed by a closure. Build one with [`consumer_fn`].
pub struct FnConsumer<F> {
    f: F,
}

/// Wrap an async closure as a [`Consumer`].
pub fn consumer_fn<F, Fut>(f: F) -> FnConsumer<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Outcome>> + Send,
{
    FnConsumer { f }
}

impl<F, Fut> Consumer for FnConsumer<F>
where
    F: Fn(Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Outcome>> + Send,
{
    fn handle(&self, message: Message) -> impl Future<Output = Option<Outcome>> + Send {
        (self.f)(message)
    }
}
