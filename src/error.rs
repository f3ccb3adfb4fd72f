//! Error types for document processing.

use std::io;

use thiserror::Error;

use crate::expr::ExpressionError;

/// `" at <path>"` suffix, empty for the document root.
fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at {}", path)
    }
}

/// `" (a.yaml -> b.yaml)"` suffix, empty outside of includes.
fn chain_suffix(chain: &str) -> String {
    if chain.is_empty() {
        String::new()
    } else {
        format!(" ({})", chain)
    }
}

/// Errors raised while processing a document.
///
/// The first error aborts the whole call. Messages carry the document
/// location (`at items[2].for`) and, inside included files, the include
/// chain (`a.yaml -> b.yaml`).
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced variable or path is missing or null.
    #[error("undefined variable '{name}'{}", at(.path))]
    UndefinedVariable { name: String, path: String },

    /// A directive value or resolved variable has the wrong kind.
    #[error("{message}{}", at(.path))]
    TypeMismatch { message: String, path: String },

    /// A directive value could not be parsed.
    #[error("{message}{}", at(.path))]
    InvalidDirectiveSyntax { message: String, path: String },

    /// An expression failed to compile or evaluate.
    #[error("error {action} expression '{expression}'{}: {source}", at(.path))]
    Expression {
        action: &'static str,
        expression: String,
        path: String,
        #[source]
        source: ExpressionError,
    },

    /// Composition was requested but the processor has no filesystem.
    #[error("cannot load {file}: no filesystem configured{}", at(.path))]
    NoFilesystem { file: String, path: String },

    #[error("error reading file {file}{}: {source}", chain_suffix(.chain))]
    FileRead {
        file: String,
        chain: String,
        #[source]
        source: io::Error,
    },

    #[error("error parsing YAML file {file}{}: {source}", chain_suffix(.chain))]
    FileParse {
        file: String,
        chain: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A file includes itself, directly or through other files.
    #[error("include cycle detected for {file} ({chain})")]
    IncludeCycle { file: String, chain: String },

    /// Processing a loaded document failed.
    #[error("error processing file {file}{}: {source}", chain_suffix(.chain))]
    Composition {
        file: String,
        chain: String,
        #[source]
        source: Box<Error>,
    },

    /// Failure reported by a custom directive handler.
    #[error("{directive}: {message}{}", at(.path))]
    Directive {
        directive: String,
        message: String,
        path: String,
    },
}

impl Error {
    pub fn undefined(name: impl Into<String>, path: impl Into<String>) -> Self {
        Error::UndefinedVariable {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>, path: impl Into<String>) -> Self {
        Error::TypeMismatch {
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn syntax(message: impl Into<String>, path: impl Into<String>) -> Self {
        Error::InvalidDirectiveSyntax {
            message: message.into(),
            path: path.into(),
        }
    }

    /// True for the composition family: missing filesystem, unreadable or
    /// unparsable files, include cycles and failures inside included
    /// documents.
    pub fn is_composition(&self) -> bool {
        matches!(
            self,
            Error::NoFilesystem { .. }
                | Error::FileRead { .. }
                | Error::FileParse { .. }
                | Error::IncludeCycle { .. }
                | Error::Composition { .. }
        )
    }

    /// The innermost error, following composition wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Composition { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
