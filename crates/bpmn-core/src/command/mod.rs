//! Undoable command execution with cross-cutting interceptors.
//!
//! A [`CommandStack`] owns a model and dispatches named commands to a
//! registered [`CommandHandler`]. Any number of interceptors may hook the
//! phases of a command through the [`InterceptorRegistry`]:
//!
//! ```text
//! requested ─► preExecute ─► execute ─► postExecute ─► committed
//!               (hooks, then    (handler,   (handler,
//!                handler)        then hooks) then hooks)
//! ```
//!
//! Commands dispatched from a pre- or post-execute [`Scope`] become nested
//! invocations of the running command and are undone and redone together with
//! it as one [`Transaction`].

mod event;
mod handler;
mod history;
mod interceptor;
mod stack;

pub use event::{ChangeTrigger, RecordingObserver, StackEvent, StackObserver};
pub use handler::CommandHandler;
pub use history::{History, InvocationRecord, Transaction};
pub use interceptor::{Commands, InterceptorRegistry, DEFAULT_PRIORITY};
pub use stack::{CommandStack, Scope};

#[cfg(test)]
pub use event::MockStackObserver;

use crate::ModelerResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a single command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    PreExecute,
    Execute,
    PostExecute,
    Revert,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PreExecute => "preExecute",
            Self::Execute => "execute",
            Self::PostExecute => "postExecute",
            Self::Revert => "revert",
        };
        f.write_str(name)
    }
}

/// Anything that can run commands against a model.
///
/// Implemented by the [`CommandStack`] itself (top-level commands) and by
/// [`Scope`] (nested commands), so helpers written against this trait work
/// both from callers and from inside interceptors.
pub trait Dispatcher<M, C> {
    fn dispatch(&mut self, command: &str, context: C) -> ModelerResult<()>;

    fn model(&self) -> &M;

    /// Untracked model access. Changes made here are not recorded for undo;
    /// use it for registering detached elements, never for attached state.
    fn model_mut(&mut self) -> &mut M;

    /// Final context of the last command completed through this dispatcher:
    /// the newest history entry for a stack, the newest child for a scope.
    fn last_context(&self) -> Option<&C>;
}
