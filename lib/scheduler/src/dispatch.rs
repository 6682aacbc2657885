//! Handler registration and fan-out for fired notifications.
//!
//! Handlers are keyed by `(notification name, handler tag)`; many handlers
//! may watch one name, each under a unique tag. Dispatch invokes handlers in
//! registration order and snapshots the handler list first, so handlers
//! registered or removed during an in-flight dispatch never corrupt it.

use crate::descriptor::NotificationDescriptor;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// A callback invoked with the descriptor that fired.
///
/// Implemented for any `Fn(&NotificationDescriptor)` closure, so plain
/// closures register directly.
pub trait NotificationHandler: Send + Sync {
    /// Reacts to a fired notification.
    fn handle(&self, descriptor: &NotificationDescriptor);
}

impl<F> NotificationHandler for F
where
    F: Fn(&NotificationDescriptor) + Send + Sync,
{
    fn handle(&self, descriptor: &NotificationDescriptor) {
        self(descriptor);
    }
}

struct HandlerEntry {
    tag: String,
    handler: Arc<dyn NotificationHandler>,
}

/// Per-name, registration-ordered handler table.
#[derive(Default)]
pub struct DispatchTable {
    state: Arc<RwLock<HashMap<String, Vec<HandlerEntry>>>>,
}

impl DispatchTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `name` under `tag`.
    ///
    /// Returns false without mutating anything if `tag` is already
    /// registered for `name`.
    pub fn register(
        &self,
        name: impl Into<String>,
        tag: impl Into<String>,
        handler: impl NotificationHandler + 'static,
    ) -> bool {
        let name = name.into();
        let tag = tag.into();
        let mut state = self.state.write().unwrap();
        let entries = state.entry(name).or_default();
        if entries.iter().any(|e| e.tag == tag) {
            return false;
        }
        entries.push(HandlerEntry {
            tag,
            handler: Arc::new(handler),
        });
        true
    }

    /// Removes the handler registered for `name` under `tag`.
    ///
    /// Returns false if no such registration exists.
    pub fn unregister(&self, name: &str, tag: &str) -> bool {
        let mut state = self.state.write().unwrap();
        let Some(entries) = state.get_mut(name) else {
            return false;
        };
        let Some(index) = entries.iter().position(|e| e.tag == tag) else {
            return false;
        };
        entries.remove(index);
        if entries.is_empty() {
            state.remove(name);
        }
        true
    }

    /// Removes every handler registered for `name`.
    ///
    /// Returns false if none existed.
    pub fn unregister_all(&self, name: &str) -> bool {
        self.state.write().unwrap().remove(name).is_some()
    }

    /// Number of handlers registered for `name`.
    #[must_use]
    pub fn handler_count(&self, name: &str) -> usize {
        self.state
            .read()
            .unwrap()
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Invokes every handler for `name`, in registration order, with the
    /// fired descriptor. Zero registered handlers is a silent no-op.
    pub fn dispatch(&self, name: &str, descriptor: &NotificationDescriptor) {
        // Snapshot under the read lock, invoke outside it.
        let snapshot: Vec<(String, Arc<dyn NotificationHandler>)> = {
            let state = self.state.read().unwrap();
            match state.get(name) {
                Some(entries) => entries
                    .iter()
                    .map(|e| (e.tag.clone(), Arc::clone(&e.handler)))
                    .collect(),
                None => Vec::new(),
            }
        };

        if snapshot.is_empty() {
            trace!(name, "fired with no registered handlers");
            return;
        }

        for (tag, handler) in snapshot {
            debug!(name, tag, "dispatching notification");
            handler.handle(descriptor);
        }
    }
}

impl Clone for DispatchTable {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap();
        let mut map = f.debug_map();
        for (name, entries) in state.iter() {
            let tags: Vec<&str> = entries.iter().map(|e| e.tag.as_str()).collect();
            map.entry(name, &tags);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn descriptor(name: &str) -> NotificationDescriptor {
        NotificationDescriptor::new(name, Duration::minutes(10))
    }

    #[test]
    fn register_rejects_duplicate_tag() {
        let table = DispatchTable::new();

        assert!(table.register("daily", "badge", |_: &NotificationDescriptor| {}));
        assert!(!table.register("daily", "badge", |_: &NotificationDescriptor| {}));
        assert_eq!(table.handler_count("daily"), 1);
    }

    #[test]
    fn same_tag_allowed_for_different_names() {
        let table = DispatchTable::new();

        assert!(table.register("daily", "badge", |_: &NotificationDescriptor| {}));
        assert!(table.register("weekly", "badge", |_: &NotificationDescriptor| {}));
    }

    #[test]
    fn dispatch_invokes_in_registration_order() {
        let table = DispatchTable::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            table.register("daily", tag, move |_: &NotificationDescriptor| {
                order.lock().unwrap().push(tag);
            });
        }

        table.dispatch("daily", &descriptor("daily"));
        assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn dispatch_with_no_handlers_is_silent() {
        let table = DispatchTable::new();
        table.dispatch("unknown", &descriptor("unknown"));
    }

    #[test]
    fn dispatch_passes_the_fired_descriptor() {
        let table = DispatchTable::new();
        let seen = Arc::new(Mutex::new(String::new()));

        let seen_by_handler = Arc::clone(&seen);
        table.register("daily", "capture", move |d: &NotificationDescriptor| {
            *seen_by_handler.lock().unwrap() = d.name.clone();
        });

        table.dispatch("daily", &descriptor("daily"));
        assert_eq!(*seen.lock().unwrap(), "daily");
    }

    #[test]
    fn unregister_specific_tag() {
        let table = DispatchTable::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_by_handler = Arc::clone(&fired);
        table.register("daily", "badge", move |_: &NotificationDescriptor| {
            fired_by_handler.fetch_add(1, Ordering::SeqCst);
        });

        assert!(table.unregister("daily", "badge"));
        assert!(!table.unregister("daily", "badge"));

        table.dispatch("daily", &descriptor("daily"));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unregister_all_removes_every_tag() {
        let table = DispatchTable::new();
        table.register("daily", "a", |_: &NotificationDescriptor| {});
        table.register("daily", "b", |_: &NotificationDescriptor| {});

        assert!(table.unregister_all("daily"));
        assert_eq!(table.handler_count("daily"), 0);
        assert!(!table.unregister_all("daily"));
    }

    #[test]
    fn registration_during_dispatch_does_not_affect_snapshot() {
        let table = DispatchTable::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let table_inside = table.clone();
        let fired_by_handler = Arc::clone(&fired);
        table.register("daily", "outer", move |_: &NotificationDescriptor| {
            fired_by_handler.fetch_add(1, Ordering::SeqCst);
            // Registering mid-dispatch must not run in this dispatch.
            table_inside.register("daily", "inner", |_: &NotificationDescriptor| {
                panic!("snapshot must not include handlers added mid-dispatch");
            });
        });

        table.dispatch("daily", &descriptor("daily"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(table.handler_count("daily"), 2);
    }
}
