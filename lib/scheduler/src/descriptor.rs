//! Notification descriptors.
//!
//! A descriptor is one schedulable logical event: its identity, firing
//! policy, and timing state. The timing state (`started_date`, `last_fired`)
//! is owned by the descriptor, mutated only through its own methods, and
//! written through to the state store before control returns to the caller.

use chrono::{DateTime, Duration, Utc};
use recur_core::store::{StateStore, last_fired_key, timer_started_key};
use serde_json::{Map, Value};

/// Sentinel returned by [`NotificationDescriptor::interval_until_next_fire`]
/// when no countdown applies (disabled, or no reference time yet).
pub const NOT_APPLICABLE: f64 = -1.0;

/// One schedulable logical event and its timing state.
#[derive(Debug, Clone)]
pub struct NotificationDescriptor {
    /// Unique name within a registry.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// How much time must elapse between fires.
    pub interval: Duration,
    /// Fire at most once for the lifetime of the stored state.
    ///
    /// Once fired, the descriptor stays terminal until
    /// [`delete_stored_data`](Self::delete_stored_data) clears it.
    pub one_time_only: bool,
    /// Whether this descriptor participates in scheduling.
    pub enabled: bool,
    /// When false the scheduler never fires this descriptor automatically;
    /// due-ness is polled through [`should_notify`](Self::should_notify)
    /// instead.
    pub causes_notification_generation: bool,
    /// Wait a full interval after arming before the first fire. When false
    /// the descriptor is immediately due the first time it is evaluated.
    pub should_wait_interval_before_first_fire: bool,
    /// Opaque key/value data handed to every handler.
    pub user_info: Map<String, Value>,
    /// Opaque payload handed to every handler.
    pub payload: Value,
    started_date: Option<DateTime<Utc>>,
    last_fired: Option<DateTime<Utc>>,
}

impl NotificationDescriptor {
    /// Creates a descriptor firing every `interval`.
    ///
    /// Defaults: enabled, recurring, automatic generation, and waiting a
    /// full interval before the first fire.
    #[must_use]
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            interval,
            one_time_only: false,
            enabled: true,
            causes_notification_generation: true,
            should_wait_interval_before_first_fire: true,
            user_info: Map::new(),
            payload: Value::Null,
            started_date: None,
            last_fired: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the descriptor as one-time-only.
    #[must_use]
    pub fn with_one_time_only(mut self, one_time_only: bool) -> Self {
        self.one_time_only = one_time_only;
        self
    }

    /// Sets whether the first fire waits a full interval.
    #[must_use]
    pub fn with_wait_before_first_fire(mut self, wait: bool) -> Self {
        self.should_wait_interval_before_first_fire = wait;
        self
    }

    /// Sets whether the scheduler fires this descriptor automatically.
    #[must_use]
    pub fn with_causes_notification_generation(mut self, causes: bool) -> Self {
        self.causes_notification_generation = causes;
        self
    }

    /// Sets the opaque user info handed to handlers.
    #[must_use]
    pub fn with_user_info(mut self, user_info: Map<String, Value>) -> Self {
        self.user_info = user_info;
        self
    }

    /// Sets the opaque payload handed to handlers.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// When the timer was first armed, if ever.
    #[must_use]
    pub fn started_date(&self) -> Option<DateTime<Utc>> {
        self.started_date
    }

    /// When the descriptor most recently fired, if ever.
    #[must_use]
    pub fn last_fired(&self) -> Option<DateTime<Utc>> {
        self.last_fired
    }

    /// True once a one-time-only descriptor has fired and is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.one_time_only && self.last_fired.is_some()
    }

    /// Restores persisted timing state from the store.
    ///
    /// Absent keys leave the corresponding field `None`; that is the normal
    /// never-armed / never-fired state.
    pub fn load_stored_state(&mut self, store: &dyn StateStore) {
        self.started_date = store.get(&timer_started_key(&self.name));
        self.last_fired = store.get(&last_fired_key(&self.name));
    }

    /// Arms the timer at `now` if it has not been armed yet, persisting the
    /// start date. Arming is idempotent: the start date is set at most once.
    pub fn arm_at(&mut self, now: DateTime<Utc>, store: &dyn StateStore) {
        if self.started_date.is_none() {
            self.started_date = Some(now);
            store.set(&timer_started_key(&self.name), now);
        }
    }

    /// Due-ness predicate with no side effects.
    ///
    /// A never-fired descriptor with no wait-before-first-fire is
    /// immediately due; otherwise the elapsed time since the reference
    /// (last fire, else arm time) must meet the interval. A fired
    /// one-time-only descriptor is never due.
    #[must_use]
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        if self.is_terminal() {
            return false;
        }
        if self.last_fired.is_none() && !self.should_wait_interval_before_first_fire {
            return true;
        }
        match self.last_fired.or(self.started_date) {
            Some(reference) => now - reference >= self.interval,
            None => false,
        }
    }

    /// Records a fire at `now` and persists it.
    pub(crate) fn mark_fired_at(&mut self, now: DateTime<Utc>, store: &dyn StateStore) {
        self.last_fired = Some(now);
        store.set(&last_fired_key(&self.name), now);
    }

    /// Manual due-check with fire side effect, evaluated at `now`.
    ///
    /// Returns true exactly once per elapsed interval: a true result records
    /// the fire (persisted before returning), so an immediate second call
    /// returns false. A false result has no side effect. This is the
    /// intended polling path for descriptors with
    /// `causes_notification_generation == false`, but is safe to call on any
    /// descriptor.
    pub fn should_notify_at(&mut self, now: DateTime<Utc>, store: &dyn StateStore) -> bool {
        if !self.is_due_at(now) {
            return false;
        }
        self.mark_fired_at(now, store);
        true
    }

    /// Manual due-check with fire side effect, evaluated at the current time.
    pub fn should_notify(&mut self, store: &dyn StateStore) -> bool {
        self.should_notify_at(Utc::now(), store)
    }

    /// Seconds until the next fire, evaluated at `now`.
    ///
    /// Returns [`NOT_APPLICABLE`] when the descriptor is disabled or has no
    /// reference time yet; otherwise a non-negative countdown (zero once
    /// due, never negative).
    #[must_use]
    pub fn interval_until_next_fire_at(&self, now: DateTime<Utc>) -> f64 {
        if !self.enabled {
            return NOT_APPLICABLE;
        }
        let Some(reference) = self.last_fired.or(self.started_date) else {
            return NOT_APPLICABLE;
        };
        let remaining = self.interval - (now - reference);
        let seconds = remaining.num_milliseconds() as f64 / 1000.0;
        seconds.max(0.0)
    }

    /// Seconds until the next fire, evaluated at the current time.
    #[must_use]
    pub fn interval_until_next_fire(&self) -> f64 {
        self.interval_until_next_fire_at(Utc::now())
    }

    /// Clears the persisted timing state, in memory and in the store.
    ///
    /// Idempotent. This is how a fired one-time-only descriptor is reset so
    /// it can fire again as if new.
    pub fn delete_stored_data(&mut self, store: &dyn StateStore) {
        self.started_date = None;
        self.last_fired = None;
        store.remove(&timer_started_key(&self.name));
        store.remove(&last_fired_key(&self.name));
    }
}
