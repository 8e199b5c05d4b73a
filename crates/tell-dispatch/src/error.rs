//! Dispatch error taxonomy.

use crate::types::RegistryKind;
use std::fmt;
use thiserror::Error;

/// How many argument tokens a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many tokens.
    Exact(usize),
    /// At least this many tokens, followed by captured text.
    AtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// A token could not be turned into the declared parameter type.
///
/// These are user input errors: the bot can explain them in a reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("missing input")]
    MissingInput,

    #[error("invalid {expected}: {input:?}")]
    Invalid { expected: &'static str, input: String },

    #[error("unknown name: {input:?}")]
    UnknownName { input: String },

    #[error("wrong number of arguments: expected {expected}, got {actual}")]
    WrongArgumentCount { expected: Arity, actual: usize },
}

impl ConversionError {
    pub fn invalid(expected: &'static str, input: impl Into<String>) -> Self {
        Self::Invalid {
            expected,
            input: input.into(),
        }
    }

    pub fn unknown_name(input: impl Into<String>) -> Self {
        Self::UnknownName {
            input: input.into(),
        }
    }

    /// The raw text that failed to convert, if any.
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::Invalid { input, .. } | Self::UnknownName { input } => Some(input),
            Self::MissingInput | Self::WrongArgumentCount { .. } => None,
        }
    }
}

/// Wiring defect in the embedding application. Never user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no {registry} converter registered for {type_name}")]
    MissingConverter {
        registry: RegistryKind,
        type_name: &'static str,
    },

    #[error("command name {key:?} is claimed by both {first:?} and {second:?}")]
    DuplicateCommand {
        key: String,
        first: String,
        second: String,
    },

    #[error("command name {name:?} has no alphanumeric characters")]
    InvalidCommandName { name: String },

    #[error("command {command:?} captures the rest of the line before its last parameter")]
    MisplacedCapture { command: String },

    #[error("bound value is not a {expected}")]
    TypeMismatch { expected: &'static str },
}

/// Result of a failed [`Dispatcher::dispatch`](crate::Dispatcher::dispatch).
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The first token matched no registered command.
    #[error("no such command: {attempted:?}")]
    NoSuchCommand { attempted: String },

    /// A token (or the token count) did not fit the handler's parameters.
    ///
    /// `position` 0 is the sender, 1.. are the arguments in declaration
    /// order; `None` means the argument list as a whole.
    #[error("{command}: {}{source}", position_prefix(.position))]
    Conversion {
        command: String,
        position: Option<usize>,
        source: ConversionError,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The handler itself failed; the error is passed through untouched.
    #[error(transparent)]
    Handler(anyhow::Error),
}

fn position_prefix(position: &Option<usize>) -> String {
    match position {
        Some(0) => "sender: ".to_string(),
        Some(n) => format!("argument {n}: "),
        None => String::new(),
    }
}

impl DispatchError {
    /// Whether the sender caused this error (unknown command or bad input).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::NoSuchCommand { .. } | Self::Conversion { .. })
    }

    pub fn conversion_error(&self) -> Option<&ConversionError> {
        match self {
            Self::Conversion { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn configuration_error(&self) -> Option<&ConfigurationError> {
        match self {
            Self::Configuration(e) => Some(e),
            _ => None,
        }
    }

    /// The error returned by the handler, if the handler ran and failed.
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Handler(e) => Some(e),
            _ => None,
        }
    }
}
