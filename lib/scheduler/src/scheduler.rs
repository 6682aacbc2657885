//! The scheduling engine.
//!
//! A [`NotificationScheduler`] owns the registry, the dispatch table, and the
//! shared state store, and evaluates every eligible descriptor on each
//! [`update`](NotificationScheduler::update) call. The scheduler is not
//! time-driven internally: the host decides the polling cadence (a periodic
//! timer, a foreground-resume hook) and calls `update` from it.
//!
//! Mutating the registry through `add_notification`/`remove_notification`
//! takes effect on the next `update` pass; callers must invoke `update`
//! after a batch of mutations. A newly added descriptor is inert (unarmed,
//! never fired) until then.

use crate::descriptor::NotificationDescriptor;
use crate::dispatch::{DispatchTable, NotificationHandler};
use crate::error::LoaderError;
use crate::loader;
use crate::registry::NotificationRegistry;
use chrono::{DateTime, Utc};
use recur_core::Result;
use recur_core::store::StateStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Evaluates descriptors for due-ness and dispatches fired notifications.
///
/// `update` and the manual `should_notify` path are the only mutation entry
/// points; both take `&mut self`, so a host with several entry threads wraps
/// the scheduler in its own mutex.
pub struct NotificationScheduler {
    enabled: bool,
    registry: NotificationRegistry,
    dispatch: DispatchTable,
    store: Arc<dyn StateStore>,
}

impl NotificationScheduler {
    /// Creates a scheduler persisting descriptor state through `store`.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            enabled: true,
            registry: NotificationRegistry::new(),
            dispatch: DispatchTable::new(),
            store,
        }
    }

    /// Whether automatic evaluation is running.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Master switch. Disabling suspends all automatic evaluation without
    /// touching descriptor state; re-enabling resumes with the persisted
    /// timestamps, so a descriptor far past due fires once, not once per
    /// missed interval.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The registry of live descriptors.
    #[must_use]
    pub fn registry(&self) -> &NotificationRegistry {
        &self.registry
    }

    /// Adds a descriptor. Returns false on a duplicate name.
    ///
    /// Call [`update`](Self::update) after a batch of additions; until then
    /// the new descriptor is not armed and cannot fire.
    pub fn add_notification(&mut self, descriptor: NotificationDescriptor) -> bool {
        self.registry.add(descriptor, &*self.store)
    }

    /// Removes the descriptor with `name`. Returns false if absent.
    ///
    /// Persisted timing state stays in the store;
    /// [`delete_stored_data`](Self::delete_stored_data) clears it.
    pub fn remove_notification(&mut self, name: &str) -> bool {
        self.registry.remove(name)
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&NotificationDescriptor> {
        self.registry.get(name)
    }

    /// Clears the persisted timing state of the descriptor with `name`,
    /// resetting it to never-armed. Returns false if no such descriptor is
    /// registered.
    pub fn delete_stored_data(&mut self, name: &str) -> bool {
        match self.registry.get_mut(name) {
            Some(descriptor) => {
                descriptor.delete_stored_data(&*self.store);
                true
            }
            None => false,
        }
    }

    /// Registers `handler` for `name` under `tag`. Returns false if the
    /// `(name, tag)` pair is already taken.
    pub fn register_handler(
        &self,
        name: impl Into<String>,
        tag: impl Into<String>,
        handler: impl NotificationHandler + 'static,
    ) -> bool {
        self.dispatch.register(name, tag, handler)
    }

    /// Removes the handler for `name` under `tag`. Returns false if absent.
    pub fn unregister_handler(&self, name: &str, tag: &str) -> bool {
        self.dispatch.unregister(name, tag)
    }

    /// Removes every handler for `name`. Returns false if none existed.
    pub fn unregister_all_handlers(&self, name: &str) -> bool {
        self.dispatch.unregister_all(name)
    }

    /// Manual due-check by name, with the fire side effect.
    ///
    /// Works regardless of `causes_notification_generation` and of the
    /// master switch, and never consults the dispatch table; the caller
    /// reacts to the boolean. Returns false for unknown names. For a
    /// descriptor held directly, [`NotificationDescriptor::should_notify`]
    /// is the same check.
    pub fn should_notify(&mut self, name: &str) -> bool {
        self.should_notify_at(name, Utc::now())
    }

    /// Manual due-check by name, evaluated at `now`.
    pub fn should_notify_at(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        match self.registry.get_mut(name) {
            Some(descriptor) => descriptor.should_notify_at(now, &*self.store),
            None => {
                debug!(name, "manual check for unknown notification");
                false
            }
        }
    }

    /// Runs one evaluation pass at the current time.
    pub fn update(&mut self) {
        self.update_at(Utc::now());
    }

    /// Runs one evaluation pass at `now`.
    ///
    /// For every descriptor that is enabled, generates notifications
    /// automatically, and is not terminal: arm it if unarmed, then fire and
    /// dispatch if due. A just-armed descriptor with no wait-before-first-
    /// fire is evaluated in this same pass. The pass is idempotent for a
    /// fixed `now`: a fired descriptor's reference time advances, so
    /// re-running cannot fire it again.
    pub fn update_at(&mut self, now: DateTime<Utc>) {
        if !self.enabled {
            trace!("scheduler disabled, skipping update pass");
            return;
        }

        let store = Arc::clone(&self.store);
        for descriptor in self.registry.iter_mut() {
            if !descriptor.enabled || !descriptor.causes_notification_generation {
                continue;
            }

            descriptor.arm_at(now, &*store);

            if descriptor.is_due_at(now) {
                descriptor.mark_fired_at(now, &*store);
                debug!(name = %descriptor.name, "notification fired");
                self.dispatch.dispatch(&descriptor.name, descriptor);
            }
        }
    }

    /// Loads declared notifications from a JSON document and adds each to
    /// the registry. Returns how many were added; duplicates of already
    /// registered names are skipped, matching `add_notification`'s contract.
    ///
    /// Call [`update`](Self::update) afterward, as with any addition.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed.
    pub fn load_config_str(&mut self, raw: &str) -> Result<usize, LoaderError> {
        let configs = loader::load_configs_str(raw)?;
        Ok(self.add_configs(configs))
    }

    /// Loads declared notifications from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_config_file(&mut self, path: impl AsRef<Path>) -> Result<usize, LoaderError> {
        let configs = loader::load_configs_file(path)?;
        Ok(self.add_configs(configs))
    }

    fn add_configs(&mut self, configs: Vec<loader::NotificationConfig>) -> usize {
        let mut added = 0;
        for config in configs {
            if self.add_notification(config.into()) {
                added += 1;
            }
        }
        debug!(added, "loaded declared notifications");
        added
    }
}

impl std::fmt::Debug for NotificationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationScheduler")
            .field("enabled", &self.enabled)
            .field("descriptors", &self.registry.len())
            .finish_non_exhaustive()
    }
}
