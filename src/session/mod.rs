//! Search session state machine and persistence
//!
//! # Module Layout
//!
//! - `state`       -- The observable [`SessionState`] value
//! - `controller`  -- [`SearchController`]: runs searches, owns the state
//! - `persistence` -- Best-effort snapshot bridge to the state store
//! - `metrics`     -- Per-search metrics tracking

pub mod controller;
pub mod metrics;
pub mod persistence;
pub mod state;

pub use controller::SearchController;
pub use persistence::PersistenceBridge;
pub use state::SessionState;
