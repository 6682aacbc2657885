//! Registry owning the live set of descriptors.
//!
//! The registry is the sole authority on name uniqueness. Insertion order is
//! preserved so the scheduler evaluates descriptors in the order they were
//! added.

use crate::descriptor::NotificationDescriptor;
use recur_core::store::StateStore;
use tracing::debug;

/// The unique-by-name set of live descriptors.
#[derive(Debug, Default)]
pub struct NotificationRegistry {
    descriptors: Vec<NotificationDescriptor>,
}

impl NotificationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor, restoring its persisted timing state from `store`.
    ///
    /// Returns false without mutating anything if a descriptor with the same
    /// name is already present. Adding has no scheduling side effects; the
    /// new entry is inert until the next `update` pass.
    pub fn add(&mut self, mut descriptor: NotificationDescriptor, store: &dyn StateStore) -> bool {
        if self.contains(&descriptor.name) {
            debug!(name = %descriptor.name, "duplicate descriptor name rejected");
            return false;
        }
        descriptor.load_stored_state(store);
        self.descriptors.push(descriptor);
        true
    }

    /// Removes the descriptor with `name`.
    ///
    /// Returns false if no such descriptor exists. Persisted timing state is
    /// left in the store; clearing it is a separate, explicit operation.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.name != name);
        self.descriptors.len() != before
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NotificationDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Looks up a descriptor by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NotificationDescriptor> {
        self.descriptors.iter_mut().find(|d| d.name == name)
    }

    /// Whether a descriptor with `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == name)
    }

    /// Iterates descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &NotificationDescriptor> {
        self.descriptors.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut NotificationDescriptor> {
        self.descriptors.iter_mut()
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
