//! Delivered messages and the at-most-once reply path.
//!
//! A request-reply send creates a `oneshot` pair: the sender lives in a
//! reply slot shared by every clone of the delivered [`Message`], the
//! receiver becomes the caller's [`ReplyHandle`]. The first `reply`/`fail`
//! takes the sender; any later attempt finds it gone and is rejected as a
//! protocol violation without touching the caller.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use switchyard_types::address::Address;
use switchyard_types::body::Body;
use switchyard_types::message::{CorrelationId, Envelope, Outcome};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;

/// Errors returned to a consumer that misuses the reply path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// The message was published; nobody is waiting for a reply.
    #[error("message {0} was published; no reply is expected")]
    NoReplyExpected(CorrelationId),

    /// The message already received its reply or failure.
    #[error("message {0} was already resolved")]
    AlreadyResolved(CorrelationId),
}

struct ReplySlot {
    address: Address,
    correlation: CorrelationId,
    sender: Mutex<Option<oneshot::Sender<Outcome>>>,
    diagnostics: Diagnostics,
}

impl ReplySlot {
    fn resolve(&self, outcome: Outcome) -> Result<(), ReplyError> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(sender) = sender else {
            self.diagnostics.record_protocol_violation();
            warn!(
                address = %self.address,
                correlation_id = %self.correlation,
                "message already resolved, ignoring duplicate reply"
            );
            return Err(ReplyError::AlreadyResolved(self.correlation));
        };

        self.deliver(sender, outcome);
        Ok(())
    }

    /// Resolve only if nobody has answered yet. Never a protocol violation.
    fn resolve_if_pending(&self, outcome: Outcome) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                self.deliver(sender, outcome);
                true
            }
            None => false,
        }
    }

    fn deliver(&self, sender: oneshot::Sender<Outcome>, outcome: Outcome) {
        if sender.send(outcome).is_err() {
            debug!(
                address = %self.address,
                correlation_id = %self.correlation,
                "caller dropped its reply handle, outcome discarded"
            );
        }
    }
}

impl Drop for ReplySlot {
    fn drop(&mut self) {
        let sender = self
            .sender
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(sender) = sender.as_ref() {
            if sender.is_closed() {
                return;
            }
            self.diagnostics.record_unanswered_request();
            warn!(
                address = %self.address,
                correlation_id = %self.correlation,
                "message dropped without a reply, request will stay pending"
            );
        }
    }
}

/// A message as seen by a consumer.
///
/// Cloning is cheap; all clones share the envelope and the reply slot, so a
/// consumer can keep a clone and answer from a spawned task.
#[derive(Clone)]
pub struct Message {
    envelope: Arc<Envelope>,
    reply: Option<Arc<ReplySlot>>,
}

impl Message {
    /// Build a request-reply message and the caller's handle for it.
    pub(crate) fn request(envelope: Envelope, diagnostics: Diagnostics) -> (Self, ReplyHandle) {
        let (sender, receiver) = oneshot::channel();
        let correlation = envelope.correlation();
        let slot = ReplySlot {
            address: envelope.address().clone(),
            correlation,
            sender: Mutex::new(Some(sender)),
            diagnostics,
        };

        let message = Self {
            envelope: Arc::new(envelope),
            reply: Some(Arc::new(slot)),
        };
        (message, ReplyHandle::new(correlation, receiver))
    }

    /// Build a fire-and-forget message.
    pub(crate) fn publication(envelope: Envelope) -> Self {
        Self {
            envelope: Arc::new(envelope),
            reply: None,
        }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn address(&self) -> &Address {
        self.envelope.address()
    }

    pub fn body(&self) -> &Body {
        self.envelope.body()
    }

    pub fn correlation(&self) -> CorrelationId {
        self.envelope.correlation()
    }

    /// Whether a caller is waiting for an outcome.
    pub fn expects_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// Answer the request successfully.
    pub fn reply(&self, body: Body) -> Result<(), ReplyError> {
        self.resolve(Outcome::Success(body))
    }

    /// Fail the request with a code and message.
    pub fn fail(&self, code: i32, message: impl Into<String>) -> Result<(), ReplyError> {
        self.resolve(Outcome::failure(code, message))
    }

    /// Deliver the outcome to the caller. Only the first call takes effect.
    pub fn resolve(&self, outcome: Outcome) -> Result<(), ReplyError> {
        match &self.reply {
            Some(slot) => slot.resolve(outcome),
            None => {
                debug!(
                    address = %self.address(),
                    correlation_id = %self.correlation(),
                    "reply to a published message ignored"
                );
                Err(ReplyError::NoReplyExpected(self.correlation()))
            }
        }
    }
}

impl Message {
    /// Fail the request on the consumer's behalf if it is still unanswered.
    pub(crate) fn resolve_if_pending(&self, outcome: Outcome) -> bool {
        self.reply
            .as_ref()
            .is_some_and(|slot| slot.resolve_if_pending(outcome))
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("address", self.address())
            .field("correlation", &self.correlation())
            .field("expects_reply", &self.expects_reply())
            .finish()
    }
}

/// Caller side of a request-reply exchange.
///
/// Resolves to exactly one [`Outcome`]. There is no timeout: if the consumer
/// never answers, the handle never resolves. Dropping the handle does not
/// retract the message.
#[must_use = "a reply handle does nothing unless awaited"]
#[derive(Debug)]
pub struct ReplyHandle {
    correlation: CorrelationId,
    receiver: oneshot::Receiver<Outcome>,
    abandoned: bool,
}

impl ReplyHandle {
    fn new(correlation: CorrelationId, receiver: oneshot::Receiver<Outcome>) -> Self {
        Self {
            correlation,
            receiver,
            abandoned: false,
        }
    }

    /// A handle that is already resolved with `outcome`.
    pub(crate) fn resolved(correlation: CorrelationId, outcome: Outcome) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(outcome);
        Self::new(correlation, receiver)
    }

    pub fn correlation(&self) -> CorrelationId {
        self.correlation
    }
}

impl Future for ReplyHandle {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.abandoned {
            return Poll::Pending;
        }

        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Every clone of the message was dropped unanswered. No timeout
            // policy exists, so the request stays pending.
            Poll::Ready(Err(_)) => {
                this.abandoned = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
