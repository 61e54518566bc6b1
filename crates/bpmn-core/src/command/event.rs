use std::cell::RefCell;

/// What caused a `Changed` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTrigger {
    Execute,
    Undo,
    Redo,
    Clear,
}

/// Lifecycle notification emitted after a phase completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    PreExecuted { command: String },
    Executed { command: String },
    PostExecuted { command: String },
    Reverted { command: String },
    Failed { command: String, error: String },
    Changed { trigger: ChangeTrigger },
}

#[cfg_attr(test, mockall::automock)]
pub trait StackObserver {
    fn notify(&self, event: &StackEvent);
}

/// Observer that keeps every event it sees.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<StackEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StackEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<StackEvent> {
        self.events.take()
    }
}

impl StackObserver for RecordingObserver {
    fn notify(&self, event: &StackEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
