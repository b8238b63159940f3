//! Room scheduling and reservation core for an institution: recurring
//! academic class rules, one-off dated schedules, and the reservation
//! lifecycle, with conflict detection across both shapes under a single
//! half-open overlap law.
//!
//! The crate is storage-agnostic: all queries go through the [`store::Store`]
//! capability injected into [`engine::Engine`] at construction. Transport,
//! authentication, and room/course CRUD belong to the embedding service.

pub mod clock;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod store;

pub use engine::{Engine, EngineError, Fault};
pub use notify::NotifyHub;
pub use store::{InMemoryStore, Store, StoreError};
