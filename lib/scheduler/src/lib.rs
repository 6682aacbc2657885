//! Interval-based notification scheduling.
//!
//! This crate provides:
//!
//! - **Descriptor**: one schedulable logical event and its timing state
//! - **Registry**: the unique-by-name set of live descriptors
//! - **Dispatch Table**: ordered `(name, tag)` handler registration and fan-out
//! - **Scheduler**: the `update` pass that arms descriptors, evaluates
//!   due-ness, and dispatches fired notifications
//! - **Loader**: declarative descriptor configuration records
//!
//! Descriptor timing state writes through a [`recur_core::StateStore`], so
//! timers and one-shot semantics survive process restarts.

pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod registry;
pub mod scheduler;

pub use descriptor::{NOT_APPLICABLE, NotificationDescriptor};
pub use dispatch::{DispatchTable, NotificationHandler};
pub use error::LoaderError;
pub use loader::NotificationConfig;
pub use registry::NotificationRegistry;
pub use scheduler::NotificationScheduler;
