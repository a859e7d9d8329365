//! Address registry: which consumer currently owns each address.
//!
//! At most one consumer is active per address. Registering onto an occupied
//! address replaces the existing consumer (last registration wins) rather
//! than rejecting or queueing behind it. The replaced consumer keeps
//! draining whatever is already in its mailbox; new traffic goes to the
//! replacement only.

use std::fmt;

use dashmap::DashMap;
use switchyard_types::address::Address;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::reply::Message;

/// Identifies one registration of a consumer at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(Uuid);

impl ConsumerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sending side of a registered consumer's mailbox.
#[derive(Clone)]
pub(crate) struct ConsumerHandle {
    id: ConsumerId,
    mailbox: mpsc::UnboundedSender<Message>,
}

impl ConsumerHandle {
    pub(crate) fn new(id: ConsumerId, mailbox: mpsc::UnboundedSender<Message>) -> Self {
        Self { id, mailbox }
    }

    pub(crate) fn id(&self) -> ConsumerId {
        self.id
    }

    /// Queue a message; hands it back if the consumer task is gone.
    pub(crate) fn deliver(&self, message: Message) -> Result<(), Message> {
        self.mailbox.send(message).map_err(|err| err.0)
    }
}

/// Mapping from address to its single active consumer.
#[derive(Default)]
pub struct AddressRegistry {
    entries: DashMap<Address, ConsumerHandle>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handle` to `address`, returning the id of the consumer it replaced.
    pub(crate) fn insert(&self, address: Address, handle: ConsumerHandle) -> Option<ConsumerId> {
        self.entries.insert(address, handle).map(|previous| previous.id)
    }

    /// Remove whatever consumer is bound to `address`.
    pub fn unregister(&self, address: &Address) -> bool {
        self.entries.remove(address).is_some()
    }

    /// Remove the binding only if `id` is still the active consumer.
    pub fn unregister_consumer(&self, address: &Address, id: ConsumerId) -> bool {
        self.entries
            .remove_if(address, |_, handle| handle.id == id)
            .is_some()
    }

    /// Current consumer at `address`, if any.
    pub fn lookup(&self, address: &Address) -> Option<ConsumerId> {
        self.entries.get(address).map(|entry| entry.id)
    }

    /// Clone of the mailbox handle, so no map guard is held during delivery.
    pub(crate) fn handle(&self, address: &Address) -> Option<ConsumerHandle> {
        self.entries.get(address).map(|entry| entry.value().clone())
    }

    /// Registered addresses in sorted order.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.entries.iter().map(|e| e.key().clone()).collect();
        addresses.sort();
        addresses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AddressRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressRegistry")
            .field("addresses", &self.addresses())
            .finish()
    }
}
