use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelerError {
    #[error("No command handler registered for <{0}>")]
    UnknownCommand(String),

    #[error("Illegal invocation of <{command}> during <{phase}> phase")]
    IllegalInvocation { command: String, phase: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing context field <{field}> for <{command}>")]
    MissingContext { command: String, field: &'static str },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Handler failed in <{command}>: {message}")]
    Handler { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl ModelerError {
    pub fn missing(command: impl Into<String>, field: &'static str) -> Self {
        Self::MissingContext {
            command: command.into(),
            field,
        }
    }

    pub fn handler(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ModelerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
