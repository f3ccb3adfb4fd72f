//! Directive-driven evaluation of YAML documents.
//!
//! Documents are plain YAML with a handful of directive keys (`if`, `for`,
//! `include`, `embed`, `matrix`, `discard`) and `${...}` interpolation in
//! strings. [`Engine::process`] expands them into concrete values.
//!
//! ```
//! use yamlexpr::{Engine, Value, convert::parse_yaml};
//!
//! let doc = parse_yaml(
//!     "replicas: 3\n\
//!      debug:\n  if: replicas > 5\n  level: trace\n\
//!      scale: ${replicas * 2}\n",
//! )
//! .unwrap();
//! let out = Engine::default().process(&doc, None).unwrap().unwrap();
//! let out = out.as_mapping().unwrap();
//! assert!(!out.contains_key("debug"));
//! assert_eq!(out["scale"], Value::Integer(6));
//! ```

pub mod config;
pub mod context;
pub mod convert;
pub mod directive;
pub mod directives;
pub mod engine;
pub mod error;
pub mod expr;
pub mod fs;
pub mod interpolate;
pub mod merge;
pub mod output;
pub mod stack;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Config, Syntax};
pub use context::{Context, ScopeGuard};
pub use directive::{Directive, Outcome, Processor, Registry};
pub use directives::{ForLoopSpec, MatrixSpec};
pub use engine::Engine;
pub use error::{Error, Result};
pub use expr::{ExpressionError, Program};
pub use fs::{DirFs, FileSystem, MemoryFs};
pub use merge::{MergeMap, deduplicate, deduplicate_with_stats, merge};
pub use output::{to_json, to_json_pretty};
pub use stack::{FieldResolver, PathCache, SerdeObject, Stack};
pub use value::{Mapping, Value};
