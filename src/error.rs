use miette::Diagnostic;
use thiserror::Error;

/// Result type for refinement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Custom error types for the else-if refiner
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum Error {
    #[error("I/O error: {0}")]
    #[diagnostic(code(elif_refine::io_error))]
    Io(String),

    #[error("Parse error: {message}")]
    #[diagnostic(code(elif_refine::parse_error))]
    Parse { message: String },

    /// The proof tactic split a single query into several goals. This breaks
    /// an assumption about the solver, so the pass must not continue.
    #[error("Unexpected multiple goals in application: expected 1, got {count}")]
    #[diagnostic(
        code(elif_refine::unexpected_subgoals),
        help("this is a bug in the refinement pass, not in the input")
    )]
    UnexpectedSubgoals { count: usize },

    #[error("Internal error: {message}")]
    #[diagnostic(code(elif_refine::internal_error))]
    Internal { message: String },
}

impl Error {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
