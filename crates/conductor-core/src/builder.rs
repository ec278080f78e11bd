//! The builder contract.
//!
//! A builder is a pluggable implementation constructed per run from a
//! cached factory. Its `run` produces an open-ended stream of build events
//! which the orchestrator forwards verbatim -- no interpretation, no
//! timeout, no cancellation wrapper. Dropping the stream is the caller's
//! cancellation.

use std::pin::Pin;

use futures_util::Stream;

use conductor_types::error::BuildError;
use conductor_types::event::BuildEvent;
use conductor_types::target::BuilderConfiguration;

use crate::context::ExecutionContext;
use crate::workspace::Workspace;

/// The event stream produced by one builder run.
///
/// Possibly long-running; failures during execution travel inside the
/// stream as `Err` items, owned by the builder.
pub type BuildEventStream =
    Pin<Box<dyn Stream<Item = Result<BuildEvent, BuildError>> + Send + 'static>>;

/// A pluggable build implementation.
pub trait Builder: Send + Sync {
    /// Execute with the fully merged, validated configuration.
    fn run(&self, config: BuilderConfiguration) -> BuildEventStream;
}

/// Constructs builder instances from an execution context.
///
/// One factory is cached per builder identifier; every run constructs a
/// fresh instance from it -- instances are never pooled or reused.
pub trait BuilderFactory<W: Workspace>: Send + Sync {
    fn create(&self, context: ExecutionContext<W>) -> Box<dyn Builder>;
}
