use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

use itertools::Itertools;

pub use cursor::Line;

/// Where on its line a diagnostic points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Unspecified,
    AtEnd,
    At(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Unspecified => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct RloxError {
    pub line: Line,
    pub location: Location,
    pub message: String,
}

impl RloxError {
    pub fn new(line: Line, location: Location, message: impl Into<String>) -> Self {
        Self { line, location, message: message.into() }
    }
}

/// All diagnostics of one run, displayed one per line.
#[derive(thiserror::Error, Debug, Default, Clone, PartialEq, Eq)]
#[error("{}", .0.iter().join("\n"))]
pub struct RloxErrors(pub Vec<RloxError>);

impl Deref for RloxErrors {
    type Target = Vec<RloxError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RloxErrors {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Sink for diagnostics of all pipeline stages.
///
/// Scanner and parser report on the syntax channel, the interpreter on the
/// runtime channel. Each channel has a sticky flag so that a driver can pick
/// an exit code once a run is over.
pub trait Reporter {
    fn error(&mut self, error: RloxError);
    fn runtime_error(&mut self, error: RloxError);

    fn had_error(&self) -> bool;
    fn had_runtime_error(&self) -> bool;

    /// Clears the syntax flag, e.g. between two lines of an interactive session.
    fn reset(&mut self);
}

/// A [`Reporter`] that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct ErrorLog {
    errors: RloxErrors,
    runtime_errors: RloxErrors,
    had_error: bool,
    had_runtime_error: bool,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &RloxErrors {
        &self.errors
    }

    pub fn runtime_errors(&self) -> &RloxErrors {
        &self.runtime_errors
    }
}

impl Reporter for ErrorLog {
    fn error(&mut self, error: RloxError) {
        log::debug!("Syntax error: {}", error);
        self.had_error = true;
        self.errors.push(error);
    }

    fn runtime_error(&mut self, error: RloxError) {
        log::debug!("Runtime error: {}", error);
        self.had_runtime_error = true;
        self.runtime_errors.push(error);
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_error = false;
    }
}
