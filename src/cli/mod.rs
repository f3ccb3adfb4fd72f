//! CLI support for yamlexpr
//!
//! Provides programmatic access to the `yamlexpr` command so other tools
//! can render documents the same way.

mod docs;
mod render;

pub use docs::{DocTopic, get_doc_topic, get_docs_overview};
pub use render::{OutputFormat, RenderOptions, execute_render, format_documents, load_syntax};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] crate::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no input provided. Pass a file, use --input or pipe YAML to stdin.")]
    NoInput,

    #[error("unknown topic: '{0}'\nRun 'yamlexpr docs' to see available topics.")]
    UnknownTopic(String),
}
