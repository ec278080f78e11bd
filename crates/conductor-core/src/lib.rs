//! Orchestration logic and collaborator traits for Conductor.
//!
//! This crate defines the "ports" the orchestrator consumes -- the
//! [`workspace::Workspace`] trait, the [`resolve::PackageResolver`] and
//! [`resolve::BuilderLoader`] capabilities, and the [`builder::Builder`]
//! contract -- plus the [`conductor::Conductor`] orchestrator that wires
//! them together. It depends only on `conductor-types` and async
//! primitives; concrete I/O implementations live in `conductor-infra`.

pub mod builder;
pub mod conductor;
pub mod context;
pub mod document;
pub mod resolve;
pub mod workspace;

pub use builder::{BuildEventStream, Builder, BuilderFactory};
pub use conductor::Conductor;
pub use context::{ExecutionContext, PartialContext};
pub use resolve::{BuilderLoader, PackageResolver};
pub use workspace::Workspace;
