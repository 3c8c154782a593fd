//! Shared types for IdGate: configuration, errors, identity collaborators and
//! structured trace events.

pub mod config;
pub mod error;
pub mod identity;
pub mod trace;
