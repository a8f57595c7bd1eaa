use std::fmt;
use std::io;

use crate::value::Kind;

/// Parse-time failure: a fixed diagnostic, the 1-based line number and the
/// offending byte (0 at end of input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: &'static str,
    pub line: u32,
    pub byte: u8,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}: {} (byte 0x{:02x})",
            self.line, self.message, self.byte
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Wrong-variant accessor use, or an illegal call against a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// An accessor or binding required this variant and found another.
    Expected(Kind),
    /// A bound method was invoked with the wrong number of arguments.
    Arity { expected: usize, got: usize },
    /// Fixed diagnostic for the remaining contract violations.
    Message(&'static str),
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Expected(kind) => write!(f, "TypeError: Expected {}", kind.name()),
            TypeError::Arity { expected, got } => write!(
                f,
                "TypeError: Incorrect number of arguments: expected {}, got {}",
                expected, got
            ),
            TypeError::Message(message) => write!(f, "TypeError: {}", message),
        }
    }
}

impl std::error::Error for TypeError {}

/// The error type for every fallible operation in the crate.
#[derive(Debug)]
pub enum JsonError {
    Syntax(SyntaxError),
    Type(TypeError),
    /// Underlying stream failure while reading or writing a document.
    Io(io::Error),
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::Syntax(e) => e.fmt(f),
            JsonError::Type(e) => e.fmt(f),
            JsonError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JsonError::Syntax(e) => Some(e),
            JsonError::Type(e) => Some(e),
            JsonError::Io(e) => Some(e),
        }
    }
}

impl From<SyntaxError> for JsonError {
    fn from(e: SyntaxError) -> Self {
        JsonError::Syntax(e)
    }
}

impl From<TypeError> for JsonError {
    fn from(e: TypeError) -> Self {
        JsonError::Type(e)
    }
}

impl From<io::Error> for JsonError {
    fn from(e: io::Error) -> Self {
        JsonError::Io(e)
    }
}

impl JsonError {
    /// The syntax error payload, if this is a parse failure.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            JsonError::Syntax(e) => Some(e),
            _ => None,
        }
    }
}
