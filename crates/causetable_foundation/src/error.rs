//! Error types for causetable.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::value::Value;

/// The main error type for causetable operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating one if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Returns the coarse category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Creates an unknown variable error.
    #[must_use]
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownVariable(name.into()))
    }

    /// Creates an unknown value error.
    #[must_use]
    pub fn unknown_value(variable: impl Into<String>, value: Value) -> Self {
        Self::new(ErrorKind::UnknownValue {
            variable: variable.into(),
            value,
        })
    }

    /// Creates a "nodes are not connected" error.
    #[must_use]
    pub fn not_connected(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotConnected {
            a: a.into(),
            b: b.into(),
        })
    }

    /// Creates a malformed shape error.
    #[must_use]
    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape(message.into()))
    }

    /// Creates a cycle error.
    #[must_use]
    pub fn cycle(source: impl Into<String>, sink: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cycle {
            from: source.into(),
            to: sink.into(),
        })
    }

    /// Creates a duplicate key error.
    #[must_use]
    pub fn duplicate_key(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateKey(name.into()))
    }

    /// Creates a state error.
    #[must_use]
    pub fn state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::State(message.into()))
    }

    /// Creates an invalid path error.
    #[must_use]
    pub fn invalid_path(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPath {
            before: before.into(),
            after: after.into(),
        })
    }

    /// Creates a parse error at the given (1-indexed) line.
    #[must_use]
    pub fn parse(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Parse {
            message: message.into(),
            line,
        })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Variable is not a column of the dataset.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// Value never occurs in the variable's observed domain.
    #[error("value {value} does not occur for variable {variable}")]
    UnknownValue {
        /// The variable that was queried.
        variable: String,
        /// The offending value.
        value: Value,
    },

    /// Two nodes have no edge between them.
    #[error("node '{a}' is not connected to '{b}'")]
    NotConnected {
        /// First node.
        a: String,
        /// Second node.
        b: String,
    },

    /// Input data is not rectangular or has clashing column names.
    #[error("malformed data: {0}")]
    Shape(String),

    /// Adding the edge would make the graph cyclic.
    #[error("edge {from} -> {to} would create a cycle")]
    Cycle {
        /// Edge source.
        from: String,
        /// Edge sink.
        to: String,
    },

    /// A key is used twice across mappings that must be disjoint.
    #[error("{0} is already used in this query")]
    DuplicateKey(String),

    /// The object lacks the state the operation needs.
    #[error("invalid state: {0}")]
    State(String),

    /// Arrow pairing around a path node is inconsistent.
    #[error("invalid path around node: before {before}, after {after}")]
    InvalidPath {
        /// Element before the node.
        before: String,
        /// Element after the node.
        after: String,
    },

    /// The evidence has zero prior probability.
    #[error("evidence has zero probability mass; cannot renormalize")]
    ZeroSupport,

    /// Network text could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: usize,
    },

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Maps this kind onto its coarse category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownVariable(_)
            | Self::UnknownValue { .. }
            | Self::NotConnected { .. }
            | Self::Shape(_) => ErrorCategory::Domain,
            Self::Cycle { .. } => ErrorCategory::Cycle,
            Self::DuplicateKey(_) => ErrorCategory::DuplicateKey,
            Self::State(_) => ErrorCategory::State,
            Self::InvalidPath { .. } => ErrorCategory::InvalidPath,
            Self::ZeroSupport => ErrorCategory::ZeroSupport,
            Self::Parse { .. } => ErrorCategory::Parse,
            Self::Serialization(_) | Self::Io(_) => ErrorCategory::Serialization,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Coarse error classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unknown variable, unknown value, or otherwise out-of-domain input.
    Domain,
    /// Acyclicity would be violated.
    Cycle,
    /// Keys reused across mappings that must be disjoint.
    DuplicateKey,
    /// Missing prior state or mutation of a finalized graph.
    State,
    /// Malformed path handed to the blocking check.
    InvalidPath,
    /// Renormalization over zero mass.
    ZeroSupport,
    /// Network text could not be parsed.
    Parse,
    /// Snapshot encoding, decoding or file access failed.
    Serialization,
    /// Bug inside the library.
    Internal,
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source name (file, query label).
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Stack of operations the error passed through, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
