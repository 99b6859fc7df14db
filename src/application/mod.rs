//! Application layer
//!
//! This layer contains use cases that orchestrate domain logic to implement
//! application-specific workflows. Use cases coordinate document sessions,
//! the backend ports, and the recents store to fulfill a single user action.

pub mod document;
pub mod project;
pub mod recents;
