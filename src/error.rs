// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

/// The main error type for HCL lexing, parsing and conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum HclError {
    SyntaxError {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    InvalidToken {
        token: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    UnexpectedEof {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a quoted template or heredoc is not closed.
    UnclosedString {
        quote: char,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for characters that start no token.
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a block's label path runs into an entry that is not an object.
    StructureError {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a constant cannot be forced into a string.
    ValueError {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    SerializeError {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// One frame of the propagation chain, e.g. `convert block: ...`.
    Context {
        context: String,
        source: Box<HclError>,
    },
}

impl HclError {
    /// Wrap this error in one more context frame.
    pub fn context(self, context: impl Into<String>) -> Self {
        HclError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every context frame peeled off.
    pub fn root_cause(&self) -> &HclError {
        match self {
            HclError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Numeric code of the innermost error, if it has one.
    pub fn code(&self) -> Option<u32> {
        match self.root_cause() {
            HclError::SyntaxError { code, .. }
            | HclError::InvalidToken { code, .. }
            | HclError::UnexpectedEof { code, .. }
            | HclError::UnclosedString { code, .. }
            | HclError::UnexpectedCharacter { code, .. }
            | HclError::StructureError { code, .. }
            | HclError::ValueError { code, .. }
            | HclError::SerializeError { code, .. } => *code,
            HclError::Context { .. } => None,
        }
    }
}

/// Adds a context frame to the error side of a `Result`.
pub trait Context<T> {
    fn context(self, context: &str) -> Result<T, HclError>;
}

impl<T> Context<T> for Result<T, HclError> {
    fn context(self, context: &str) -> Result<T, HclError> {
        self.map_err(|e| e.context(context))
    }
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl fmt::Display for HclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HclError::SyntaxError { message, line, column, hint, code } =>
                write!(f, "[HCL] Syntax Error at {}:{}: {}{}",
                    line, column, message, suffix(hint, code)),
            HclError::InvalidToken { token, line, column, hint, code } =>
                write!(f, "[HCL] Invalid Token '{}' at {}:{}{}",
                    token, line, column, suffix(hint, code)),
            HclError::UnexpectedEof { message, line, column, hint, code } =>
                write!(f, "[HCL] Unexpected EOF at {}:{}: {}{}",
                    line, column, message, suffix(hint, code)),
            HclError::UnclosedString { quote, line, column, hint, code } =>
                write!(f, "[HCL] Unclosed string starting with '{}' at {}:{}{}",
                    quote, line, column, suffix(hint, code)),
            HclError::UnexpectedCharacter { character, line, column, hint, code } =>
                write!(f, "[HCL] Unexpected character '{}' at {}:{}{}",
                    character, line, column, suffix(hint, code)),
            HclError::StructureError { message, hint, code } =>
                write!(f, "[HCL] Structure Error: {}{}", message, suffix(hint, code)),
            HclError::ValueError { message, line, column, hint, code } =>
                write!(f, "[HCL] Value Error at {}:{}: {}{}",
                    line, column, message, suffix(hint, code)),
            HclError::SerializeError { message, hint, code } =>
                write!(f, "[HCL] Serialize Error: {}{}", message, suffix(hint, code)),
            HclError::Context { context, source } =>
                write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for HclError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HclError::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for HclError {
    fn from(err: serde_json::Error) -> Self {
        HclError::SerializeError {
            message: err.to_string(),
            hint: None,
            code: Some(310),
        }
    }
}
