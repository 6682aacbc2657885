//! Persistence foundation for the recur notification scheduler.
//!
//! This crate provides the key/value state store descriptors use to survive
//! process restarts, plus the shared `Result` alias and store error types.

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{
    JsonFileStateStore, MemoryStateStore, StateStore, last_fired_key, timer_started_key,
};
