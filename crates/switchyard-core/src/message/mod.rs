//! In-process message bus with address-based consumers and request-reply.
//!
//! This module provides the runtime messaging infrastructure:
//! - `bus` -- `MessageBus` with per-address mailboxes, publish, and send-with-reply
//! - `registry` -- `AddressRegistry`, one active consumer per address
//! - `reply` -- delivered `Message`, at-most-once reply slot, caller `ReplyHandle`
//! - `handler` -- `Consumer` trait and the closure adapter `consumer_fn`

pub mod bus;
pub mod handler;
pub mod registry;
pub mod reply;

pub use bus::MessageBus;
pub use handler::{Consumer, FnConsumer, consumer_fn};
pub use registry::{AddressRegistry, ConsumerId};
pub use reply::{Message, ReplyError, ReplyHandle};
