use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("a tool with id `{0}` is already registered")]
    DuplicateId(&'static str),

    #[error("no tool registered with id `{0}`")]
    UnknownTool(String),

    #[error("context state for tool `{id}` must be a `{expected}`")]
    ContextTypeMismatch { id: String, expected: &'static str },

    #[error("tool `{id}` panicked in {handler}: {message}")]
    HandlerPanicked {
        id: &'static str,
        handler: &'static str,
        message: String,
    },
}
