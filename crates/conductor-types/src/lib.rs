//! Shared domain types for Conductor.
//!
//! This crate defines the data model the orchestrator and its collaborators
//! exchange: projects, targets, builder identities and manifests, build
//! events, and the error taxonomy. It depends only on serde and thiserror --
//! never on any I/O or runtime crate.

pub mod builder;
pub mod error;
pub mod event;
pub mod project;
pub mod target;
