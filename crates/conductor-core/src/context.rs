//! Per-run execution context.
//!
//! Assembled fresh for every run: a default context (null logging span,
//! orchestrator back-reference, workspace handle) overlaid with
//! caller-supplied overrides, caller keys winning. Entirely ephemeral.

use std::sync::Arc;

use crate::conductor::Conductor;
use crate::workspace::Workspace;

/// Everything a builder instance receives at construction time.
pub struct ExecutionContext<W: Workspace> {
    /// Logging span for the run. The default is [`tracing::Span::none`];
    /// whether builder events are emitted is the subscriber's decision.
    pub logger: tracing::Span,
    /// Back-reference to the orchestrator, for builders that schedule
    /// further targets.
    pub conductor: Conductor<W>,
    /// The workspace handle, which also carries the raw read capability.
    pub workspace: Arc<W>,
}

impl<W: Workspace> Clone for ExecutionContext<W> {
    fn clone(&self) -> Self {
        Self {
            logger: self.logger.clone(),
            conductor: self.conductor.clone(),
            workspace: Arc::clone(&self.workspace),
        }
    }
}

/// Caller-supplied overrides for individual context fields.
pub struct PartialContext<W: Workspace> {
    pub logger: Option<tracing::Span>,
    pub workspace: Option<Arc<W>>,
}

impl<W: Workspace> Default for PartialContext<W> {
    fn default() -> Self {
        Self {
            logger: None,
            workspace: None,
        }
    }
}

impl<W: Workspace> PartialContext<W> {
    pub fn with_logger(mut self, logger: tracing::Span) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_workspace(mut self, workspace: Arc<W>) -> Self {
        self.workspace = Some(workspace);
        self
    }
}
