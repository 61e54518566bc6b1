use std::collections::HashMap;
use std::rc::Rc;

use super::{
    ChangeTrigger, CommandHandler, Dispatcher, History, InterceptorRegistry, Phase, StackEvent,
    StackObserver, Transaction,
};
use crate::logging::{JournalAction, LogEntry, Loggable, JOURNAL_CAPACITY};
use crate::{ModelerError, ModelerResult};

/// In-flight invocation: its record in the pending transaction and the phase
/// it is currently running.
struct Frame {
    record: usize,
    phase: Phase,
}

/// Transactional command stack over a model `M` with context type `C`.
///
/// The stack exclusively owns the model and the undo/redo history. Commands
/// run synchronously; everything a command dispatches while it runs lands in
/// the same [`Transaction`] and is undone and redone with it.
///
/// A handler or hook that fails aborts the command: nothing is committed and
/// nothing is rolled back. Mutations made before the failure stay in place, so
/// interceptors should perform destructive changes last.
pub struct CommandStack<M, C> {
    model: M,
    handlers: HashMap<String, Rc<dyn CommandHandler<M, C>>>,
    interceptors: InterceptorRegistry<M, C>,
    history: History<C>,
    /// Last committed transaction the history had no room for.
    unrecorded: Option<Transaction<C>>,
    pending: Transaction<C>,
    frames: Vec<Frame>,
    observers: Vec<Rc<dyn StackObserver>>,
    journal: Vec<LogEntry>,
}

impl<M, C> CommandStack<M, C> {
    pub fn new(model: M) -> Self {
        Self::with_history_limit(model, None)
    }

    pub fn with_history_limit(model: M, limit: Option<usize>) -> Self {
        Self {
            model,
            handlers: HashMap::new(),
            interceptors: InterceptorRegistry::new(),
            history: History::with_limit(limit),
            unrecorded: None,
            pending: Transaction::new(),
            frames: Vec::new(),
            observers: Vec::new(),
            journal: Vec::new(),
        }
    }

    /// Register the core handler for `command`, replacing any previous one.
    pub fn register_handler<H>(&mut self, command: impl Into<String>, handler: H)
    where
        H: CommandHandler<M, C> + 'static,
    {
        let command = command.into();
        if self.handlers.insert(command.clone(), Rc::new(handler)).is_some() {
            tracing::warn!("Replacing command handler for <{}>", command);
        }
    }

    pub fn has_handler(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    pub fn interceptors(&mut self) -> &mut InterceptorRegistry<M, C> {
        &mut self.interceptors
    }

    pub fn subscribe(&mut self, observer: Rc<dyn StackObserver>) {
        self.observers.push(observer);
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn history(&self) -> &History<C> {
        &self.history
    }

    /// Run `command` and commit it, with everything it spawned, as one
    /// history entry. Clears the redo history.
    pub fn execute(&mut self, command: &str, context: C) -> ModelerResult<()> {
        tracing::debug!("Executing: {}", command);

        let result = self.invoke(command, context);
        let transaction = std::mem::take(&mut self.pending);
        self.frames.clear();

        match result {
            Ok(()) => {
                tracing::trace!(
                    "Committed <{}> with {} invocation(s)",
                    command,
                    transaction.len()
                );
                self.unrecorded = self.history.push(transaction);
                self.add_log(LogEntry::new(JournalAction::Execute, Some(command.to_string())));
                self.emit(StackEvent::Changed {
                    trigger: ChangeTrigger::Execute,
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Command <{}> failed: {}", command, err);
                self.emit(StackEvent::Failed {
                    command: command.to_string(),
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Revert the most recent transaction. No-op when there is nothing to undo.
    pub fn undo(&mut self) -> ModelerResult<()> {
        let Some(transaction) = self.history.pop_undo() else {
            tracing::debug!("Nothing to undo");
            return Ok(());
        };
        let command = root_command(&transaction);
        tracing::debug!("Undoing: {}", command);

        if let Err(err) = self.revert_transaction(&transaction) {
            tracing::warn!("Undo of <{}> failed, clearing history: {}", command, err);
            self.history.clear();
            return Err(err);
        }

        self.history.push_redo(transaction);
        self.add_log(LogEntry::new(JournalAction::Undo, Some(command)));
        self.emit(StackEvent::Changed {
            trigger: ChangeTrigger::Undo,
        });
        Ok(())
    }

    /// Replay the most recently undone transaction. No-op when there is nothing to redo.
    pub fn redo(&mut self) -> ModelerResult<()> {
        let Some(mut transaction) = self.history.pop_redo() else {
            tracing::debug!("Nothing to redo");
            return Ok(());
        };
        let command = root_command(&transaction);
        tracing::debug!("Redoing: {}", command);

        if let Err(err) = self.replay_transaction(&mut transaction) {
            tracing::warn!("Redo of <{}> failed, clearing history: {}", command, err);
            self.history.clear();
            return Err(err);
        }

        self.history.push_undo(transaction);
        self.add_log(LogEntry::new(JournalAction::Redo, Some(command)));
        self.emit(StackEvent::Changed {
            trigger: ChangeTrigger::Redo,
        });
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Forget all history, e.g. after a new diagram was imported.
    pub fn clear(&mut self) {
        self.history.clear();
        self.unrecorded = None;
        self.add_log(LogEntry::new(JournalAction::Clear, None));
        self.emit(StackEvent::Changed {
            trigger: ChangeTrigger::Clear,
        });
    }

    fn handler(&self, command: &str) -> ModelerResult<Rc<dyn CommandHandler<M, C>>> {
        self.handlers
            .get(command)
            .cloned()
            .ok_or_else(|| ModelerError::UnknownCommand(command.to_string()))
    }

    fn emit(&self, event: StackEvent) {
        for observer in &self.observers {
            observer.notify(&event);
        }
    }

    /// Run one invocation, top-level or nested, inside the pending transaction.
    fn invoke(&mut self, command: &str, mut context: C) -> ModelerResult<()> {
        let handler = self.handler(command)?;
        let parent = self.frames.last().map(|frame| (frame.record, frame.phase));
        let record = self.pending.open(command, parent);

        self.frames.push(Frame {
            record,
            phase: Phase::PreExecute,
        });
        let result = self.run_phases(command, handler.as_ref(), record, &mut context);
        self.frames.pop();

        // Kept even on failure: whatever did execute can still be reverted.
        self.pending.close(record, context);
        result
    }

    fn enter(&mut self, phase: Phase) {
        if let Some(frame) = self.frames.last_mut() {
            frame.phase = phase;
        }
    }

    fn run_phases(
        &mut self,
        command: &str,
        handler: &dyn CommandHandler<M, C>,
        record: usize,
        context: &mut C,
    ) -> ModelerResult<()> {
        tracing::trace!("<{}> {}", command, Phase::PreExecute);
        let hooks = self.interceptors.pre_execute_hooks(command);
        {
            let mut scope = Scope::new(self, command, Phase::PreExecute, context);
            for hook in &hooks {
                hook(&mut scope)?;
            }
            handler.pre_execute(&mut scope)?;
        }
        self.emit(StackEvent::PreExecuted {
            command: command.to_string(),
        });

        tracing::trace!("<{}> {}", command, Phase::Execute);
        self.enter(Phase::Execute);
        self.execute_phase(command, handler, context)?;
        self.pending.mark_executed(record);
        self.emit(StackEvent::Executed {
            command: command.to_string(),
        });

        tracing::trace!("<{}> {}", command, Phase::PostExecute);
        self.enter(Phase::PostExecute);
        let hooks = self.interceptors.post_execute_hooks(command);
        {
            let mut scope = Scope::new(self, command, Phase::PostExecute, context);
            handler.post_execute(&mut scope)?;
            for hook in &hooks {
                hook(&mut scope)?;
            }
        }
        self.emit(StackEvent::PostExecuted {
            command: command.to_string(),
        });

        Ok(())
    }

    fn execute_phase(
        &mut self,
        command: &str,
        handler: &dyn CommandHandler<M, C>,
        context: &mut C,
    ) -> ModelerResult<()> {
        handler.execute(&mut self.model, context)?;
        for hook in self.interceptors.execute_hooks(command) {
            hook(&mut self.model, context)?;
        }
        Ok(())
    }

    fn revert_transaction(&mut self, transaction: &Transaction<C>) -> ModelerResult<()> {
        for &index in transaction.execution_order().iter().rev() {
            let Some(record) = transaction.record(index) else {
                continue;
            };
            let Some(context) = record.context() else {
                continue;
            };
            let command = record.command();
            let handler = self.handler(command)?;

            tracing::trace!("<{}> {}", command, Phase::Revert);
            for hook in self.interceptors.revert_hooks(command) {
                hook(&mut self.model, context)?;
            }
            handler.revert(&mut self.model, context)?;
            self.emit(StackEvent::Reverted {
                command: command.to_string(),
            });
        }
        Ok(())
    }

    fn replay_transaction(&mut self, transaction: &mut Transaction<C>) -> ModelerResult<()> {
        let order = transaction.execution_order().to_vec();
        for index in order {
            let Some((command, context)) = transaction.split_record_mut(index) else {
                continue;
            };
            let handler = self.handler(command)?;
            self.execute_phase(command, handler.as_ref(), context)?;
            self.emit(StackEvent::Executed {
                command: command.to_string(),
            });
        }
        Ok(())
    }
}

fn root_command<C>(transaction: &Transaction<C>) -> String {
    transaction
        .root()
        .map(|record| record.command().to_string())
        .unwrap_or_default()
}

impl<M, C> Dispatcher<M, C> for CommandStack<M, C> {
    fn dispatch(&mut self, command: &str, context: C) -> ModelerResult<()> {
        self.execute(command, context)
    }

    fn model(&self) -> &M {
        &self.model
    }

    fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    fn last_context(&self) -> Option<&C> {
        self.unrecorded
            .as_ref()
            .or_else(|| self.history.peek_undo())
            .and_then(Transaction::root)
            .and_then(|record| record.context())
    }
}

impl<M, C> Loggable for CommandStack<M, C> {
    fn add_log(&mut self, entry: LogEntry) {
        self.journal.push(entry);
        if self.journal.len() > JOURNAL_CAPACITY {
            let excess = self.journal.len() - JOURNAL_CAPACITY;
            self.journal.drain(..excess);
        }
    }

    fn get_logs(&self) -> &[LogEntry] {
        &self.journal
    }
}

/// View of a running invocation handed to pre- and post-execute hooks.
///
/// Commands dispatched through a scope become children of the running
/// invocation.
pub struct Scope<'a, M, C> {
    stack: &'a mut CommandStack<M, C>,
    command: &'a str,
    phase: Phase,
    context: &'a mut C,
}

impl<'a, M, C> Scope<'a, M, C> {
    fn new(
        stack: &'a mut CommandStack<M, C>,
        command: &'a str,
        phase: Phase,
        context: &'a mut C,
    ) -> Self {
        Self {
            stack,
            command,
            phase,
            context,
        }
    }

    pub fn command(&self) -> &str {
        self.command
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &C {
        &*self.context
    }

    /// Writable context; only available before the execute phase.
    pub fn context_mut(&mut self) -> ModelerResult<&mut C> {
        if self.phase != Phase::PreExecute {
            return Err(ModelerError::IllegalInvocation {
                command: self.command.to_string(),
                phase: self.phase.to_string(),
            });
        }
        Ok(&mut *self.context)
    }
}

impl<M, C> Dispatcher<M, C> for Scope<'_, M, C> {
    fn dispatch(&mut self, command: &str, context: C) -> ModelerResult<()> {
        tracing::trace!("<{}> {} dispatches <{}>", self.command, self.phase, command);
        self.stack.invoke(command, context)
    }

    fn model(&self) -> &M {
        &self.stack.model
    }

    fn model_mut(&mut self) -> &mut M {
        &mut self.stack.model
    }

    fn last_context(&self) -> Option<&C> {
        let frame = self.stack.frames.last()?;
        let pending = &self.stack.pending;
        let child = *pending.record(frame.record)?.children().last()?;
        pending.record(child)?.context()
    }
}
