pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod result;

pub use command::{
    ChangeTrigger, CommandHandler, CommandStack, Commands, Dispatcher, History,
    InterceptorRegistry, InvocationRecord, Phase, RecordingObserver, Scope, StackEvent,
    StackObserver, Transaction, DEFAULT_PRIORITY,
};
pub use config::ModelerConfig;
pub use error::ModelerError;
pub use logging::{JournalAction, LogEntry, Loggable, JOURNAL_CAPACITY};
pub use result::ModelerResult;
