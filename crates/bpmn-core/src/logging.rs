use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalAction {
    Execute,
    Undo,
    Redo,
    Clear,
}

impl fmt::Display for JournalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Execute => "execute",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// One line of the command journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: JournalAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl LogEntry {
    pub fn new(action: JournalAction, command: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            command,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.command {
            Some(command) => write!(f, "{} {}", self.action, command),
            None => write!(f, "{}", self.action),
        }
    }
}

/// Journal entries a command stack keeps; older ones are dropped first.
pub const JOURNAL_CAPACITY: usize = 1000;

pub trait Loggable {
    fn add_log(&mut self, entry: LogEntry);
    fn get_logs(&self) -> &[LogEntry];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let entry = LogEntry::new(JournalAction::Undo, Some("shape.create".to_string()));
        assert_eq!(entry.to_string(), "undo shape.create");

        let entry = LogEntry::new(JournalAction::Clear, None);
        assert_eq!(entry.to_string(), "clear");
    }
}
