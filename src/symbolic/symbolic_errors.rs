//! Error tags shared by the parser, evaluator, differentiator and GLSL generator.
//!
//! Every pass returns `Result<_, ExprError>` and hands the first child error upward
//! unchanged. The UI only needs `ExprError::kind()` and `ErrorKind::message()` to show
//! a short text beside the offending field; the variant data (positions, names) is there
//! for logging and for richer messages.
use crate::symbolic::symbolic_glsl::InputMode;
use std::fmt;
use strum_macros::{Display, EnumIter};

/// closed set of error tags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ErrorKind {
    #[strum(serialize = "SYNTAX_ERROR")]
    SyntaxError,
    #[strum(serialize = "NO_CLOSE_BRACKET")]
    NoCloseBracket,
    #[strum(serialize = "UNIDENTIFIED_FUNCTION")]
    UnidentifiedFunction,
    #[strum(serialize = "UNIDENTIFIED_OPERATION")]
    UnidentifiedOperation,
    #[strum(serialize = "UNIDENTIFIED_VARIABLE")]
    UnidentifiedVariable,
    #[strum(serialize = "INVALID_VARIABLE")]
    InvalidVariable,
    #[strum(serialize = "MALFORMED_NODE")]
    MalformedNode,
    #[strum(serialize = "CONFIG_ERROR")]
    Config,
}

impl ErrorKind {
    /// static text shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "Syntax error",
            ErrorKind::NoCloseBracket => "Missing closing bracket",
            ErrorKind::UnidentifiedFunction => "Unknown function",
            ErrorKind::UnidentifiedOperation => "Unexpected symbol",
            ErrorKind::UnidentifiedVariable => "Unknown variable",
            ErrorKind::InvalidVariable => "Variable not allowed in this mode",
            ErrorKind::MalformedNode => "Malformed expression",
            ErrorKind::Config => "Invalid configuration",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprError {
    /// nothing parseable at `position` (char index in the original input)
    SyntaxError { position: usize },
    /// the bracket opened at `position` is never closed
    NoCloseBracket { position: usize },
    UnidentifiedFunction { name: String },
    /// input left over after a complete expression
    UnidentifiedOperation { position: usize, token: char },
    UnidentifiedVariable { name: String },
    InvalidVariable { name: String, mode: InputMode },
    /// a hand-built node whose child count does not fit its kind
    MalformedNode { arity: usize },
    Config { message: String },
}

impl ExprError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExprError::SyntaxError { .. } => ErrorKind::SyntaxError,
            ExprError::NoCloseBracket { .. } => ErrorKind::NoCloseBracket,
            ExprError::UnidentifiedFunction { .. } => ErrorKind::UnidentifiedFunction,
            ExprError::UnidentifiedOperation { .. } => ErrorKind::UnidentifiedOperation,
            ExprError::UnidentifiedVariable { .. } => ErrorKind::UnidentifiedVariable,
            ExprError::InvalidVariable { .. } => ErrorKind::InvalidVariable,
            ExprError::MalformedNode { .. } => ErrorKind::MalformedNode,
            ExprError::Config { .. } => ErrorKind::Config,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ExprError::Config {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExprError::SyntaxError { position } => {
                write!(f, "{} at position {}", self.kind(), position + 1)
            }
            ExprError::NoCloseBracket { position } => write!(
                f,
                "{}: bracket opened at position {} is not closed",
                self.kind(),
                position + 1
            ),
            ExprError::UnidentifiedFunction { name } => write!(f, "{}: '{}'", self.kind(), name),
            ExprError::UnidentifiedOperation { position, token } => write!(
                f,
                "{}: '{}' at position {}",
                self.kind(),
                token,
                position + 1
            ),
            ExprError::UnidentifiedVariable { name } => write!(f, "{}: '{}'", self.kind(), name),
            ExprError::InvalidVariable { name, mode } => {
                write!(f, "{}: '{}' in {} mode", self.kind(), name, mode)
            }
            ExprError::MalformedNode { arity } => {
                write!(f, "{}: node with {} children", self.kind(), arity)
            }
            ExprError::Config { message } => write!(f, "{}: {}", self.kind(), message),
        }
    }
}

impl std::error::Error for ExprError {}
