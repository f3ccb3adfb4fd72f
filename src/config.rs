//! Processor configuration.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::directive::Directive;
use crate::fs::FileSystem;
use crate::stack::PathCache;

/// Directive keywords recognized in documents.
///
/// Deserializes from YAML or JSON; absent or empty fields keep their
/// defaults.
///
/// ```
/// use yamlexpr::Syntax;
///
/// let syntax: Syntax = serde_yaml::from_str("if: v-if\nfor: v-for\n").unwrap();
/// let syntax = Syntax::default().overlay(&syntax);
/// assert_eq!(syntax.r#if, "v-if");
/// assert_eq!(syntax.include, "include");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Syntax {
    pub r#if: String,
    pub r#for: String,
    pub include: String,
    pub embed: String,
    pub matrix: String,
    pub discard: String,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            r#if: "if".to_string(),
            r#for: "for".to_string(),
            include: "include".to_string(),
            embed: "embed".to_string(),
            matrix: "matrix".to_string(),
            discard: "discard".to_string(),
        }
    }
}

impl Syntax {
    /// `self` with every non-empty keyword of `other` applied.
    pub fn overlay(&self, other: &Syntax) -> Syntax {
        let pick = |base: &String, over: &String| {
            if over.trim().is_empty() {
                base.clone()
            } else {
                over.clone()
            }
        };
        Syntax {
            r#if: pick(&self.r#if, &other.r#if),
            r#for: pick(&self.r#for, &other.r#for),
            include: pick(&self.include, &other.include),
            embed: pick(&self.embed, &other.embed),
            matrix: pick(&self.matrix, &other.matrix),
            discard: pick(&self.discard, &other.discard),
        }
    }
}

/// Builder for [`Engine`](crate::Engine).
///
/// ```
/// use std::sync::Arc;
/// use yamlexpr::{Config, Engine, MemoryFs, Syntax};
///
/// let fs = MemoryFs::new().with_file("base.yaml", "env: prod\n");
/// let engine = Engine::new(
///     Config::new()
///         .with_fs(Arc::new(fs))
///         .with_syntax(Syntax { r#if: "when".into(), ..Syntax::default() }),
/// );
/// assert_eq!(engine.syntax().r#if, "when");
/// ```
#[derive(Clone)]
pub struct Config {
    pub(crate) syntax: Syntax,
    pub(crate) fs: Option<Arc<dyn FileSystem>>,
    pub(crate) directives: Vec<(String, Arc<dyn Directive>)>,
    pub(crate) path_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            syntax: Syntax::default(),
            fs: None,
            directives: Vec::new(),
            path_cache_capacity: PathCache::DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override directive keywords; empty fields keep the current keyword.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = self.syntax.overlay(&syntax);
        self
    }

    /// Filesystem for `include` and `embed`. Without one, composition fails.
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Register a handler for `keyword`.
    ///
    /// New keywords run after the built-in directives, in registration
    /// order. Registering a built-in keyword replaces the built-in handler.
    pub fn with_directive(mut self, keyword: impl Into<String>, handler: Arc<dyn Directive>) -> Self {
        let keyword = keyword.into();
        match self.directives.iter_mut().find(|(k, _)| *k == keyword) {
            Some(entry) => entry.1 = handler,
            None => self.directives.push((keyword, handler)),
        }
        self
    }

    pub fn with_path_cache_capacity(mut self, capacity: usize) -> Self {
        self.path_cache_capacity = capacity;
        self
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("syntax", &self.syntax)
            .field("fs", &self.fs.is_some())
            .field(
                "directives",
                &self.directives.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            )
            .field("path_cache_capacity", &self.path_cache_capacity)
            .finish()
    }
}
