//! Message envelope and request-reply outcome types.
//!
//! An [`Envelope`] is the unit of transport on the bus: the target address,
//! the body, and a correlation id that ties a reply back to its send. An
//! [`Outcome`] is the single terminal result of a request-reply exchange.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;
use crate::body::Body;
use crate::error::BusError;

/// Failure code used when no consumer is registered at the target address.
pub const NO_HANDLER: i32 = -1;

/// Failure message paired with [`NO_HANDLER`].
pub const NO_HANDLER_MESSAGE: &str = "no consumer registered";

/// Failure code used when a consumer panics while handling a request.
pub const CONSUMER_PANICKED: i32 = -2;

/// Failure message paired with [`CONSUMER_PANICKED`].
pub const CONSUMER_PANICKED_MESSAGE: &str = "consumer panicked";

/// Identifier matching a reply to its originating send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A message in transit on the bus.
///
/// Immutable after creation: fields are private and only exposed by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    address: Address,
    body: Body,
    correlation: CorrelationId,
    created_at: DateTime<Utc>,
}

impl Envelope {
    /// Build an envelope with a fresh correlation id.
    pub fn new(address: Address, body: Body) -> Self {
        Self {
            address,
            body,
            correlation: CorrelationId::new(),
            created_at: Utc::now(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn correlation(&self) -> CorrelationId {
        self.correlation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Terminal result of a request-reply exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Body),
    Failure { code: i32, message: String },
}

impl Outcome {
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self::Failure {
            code,
            message: message.into(),
        }
    }

    /// The outcome delivered when a request targets an address with no consumer.
    pub fn no_handler() -> Self {
        Self::failure(NO_HANDLER, NO_HANDLER_MESSAGE)
    }

    pub fn consumer_panicked() -> Self {
        Self::failure(CONSUMER_PANICKED, CONSUMER_PANICKED_MESSAGE)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Split into the success body or the typed bus error.
    pub fn into_result(self) -> Result<Body, BusError> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure { code, message } if code == NO_HANDLER => {
                Err(BusError::NoHandlerRegistered { message })
            }
            Self::Failure { code, message } => {
                Err(BusError::ConsumerReportedFailure { code, message })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
