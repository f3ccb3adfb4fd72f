//! The document walker.
//!
//! [`Engine`] walks a value tree depth-first. Mappings that carry a
//! registered directive keyword are handed to the directive handlers in
//! registration order; everything else is rebuilt node by node with
//! `${...}` spans in strings interpolated against the scope stack.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{Config, Syntax};
use crate::context::Context;
use crate::convert::{parse_yaml, parse_yaml_documents};
use crate::directive::{Processor, Registry};
use crate::directives;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::interpolate::interpolate_value;
use crate::merge::merge;
use crate::stack::{PathCache, Stack};
use crate::value::{Mapping, Value};

/// Evaluates documents against a fixed configuration.
///
/// An engine is immutable once built and can be shared between threads;
/// every `process` call gets its own stack and context.
///
/// ```
/// use yamlexpr::{Engine, convert::parse_yaml};
///
/// let doc = parse_yaml("items: [alice, bob]\nusers:\n  - for: item in items\n    name: ${item}\n").unwrap();
/// let out = Engine::default().process(&doc, None).unwrap().unwrap();
/// assert_eq!(out.as_mapping().unwrap()["users"].as_sequence().unwrap().len(), 2);
/// ```
pub struct Engine {
    syntax: Syntax,
    fs: Option<Arc<dyn FileSystem>>,
    registry: Registry,
    paths: Arc<PathCache>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let mut registry = directives::builtin(&config.syntax);
        for (keyword, handler) in config.directives {
            registry.register(keyword, handler);
        }
        debug!(directives = ?registry, "engine configured");
        Engine {
            syntax: config.syntax,
            fs: config.fs,
            registry,
            paths: Arc::new(PathCache::with_capacity(config.path_cache_capacity)),
        }
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// An empty stack sharing this engine's path cache.
    pub fn stack(&self) -> Stack {
        Stack::with_cache(Mapping::new(), Arc::clone(&self.paths))
    }

    /// Process `doc` with `root_vars` in scope.
    ///
    /// When `doc` is a mapping its top-level keys are visible as variables
    /// too, overriding `root_vars`. `Ok(None)` means the whole document was
    /// omitted.
    pub fn process(&self, doc: &Value, root_vars: Option<Mapping>) -> Result<Option<Value>> {
        let mut vars = root_vars.unwrap_or_default();
        if let Value::Mapping(map) = doc {
            for (k, v) in map {
                vars.insert(k.clone(), v.clone());
            }
        }
        self.process_with_stack(doc, Stack::with_cache(vars, Arc::clone(&self.paths)))
    }

    /// Process `doc` against a caller-built stack.
    pub fn process_with_stack(&self, doc: &Value, stack: Stack) -> Result<Option<Value>> {
        let ctx = Context::new(stack);
        self.process_with_context(&ctx, doc)
    }

    /// Process `doc` into output documents.
    ///
    /// A mapping that expands to a sequence at the root (a root-level `for`
    /// or `matrix`) yields one document per element.
    pub fn parse(&self, doc: &Value) -> Result<Vec<Value>> {
        let documents = match self.process(doc, None)? {
            None => Vec::new(),
            Some(Value::Sequence(items)) if matches!(doc, Value::Mapping(_)) => items,
            Some(value) => vec![value],
        };
        Ok(documents)
    }

    /// Read `filename` through the configured filesystem and [`parse`] every
    /// YAML document in it.
    ///
    /// [`parse`]: Engine::parse
    #[tracing::instrument(skip(self))]
    pub fn load(&self, filename: &str) -> Result<Vec<Value>> {
        let bytes = self.read(filename, "", "")?;
        let docs = parse_yaml_documents(&String::from_utf8_lossy(&bytes)).map_err(|source| {
            Error::FileParse {
                file: filename.to_string(),
                chain: String::new(),
                source,
            }
        })?;

        let mut output = Vec::new();
        for doc in &docs {
            let parsed = self.parse(doc).map_err(|err| Error::Composition {
                file: filename.to_string(),
                chain: String::new(),
                source: Box::new(err),
            })?;
            output.extend(parsed);
        }
        debug!(documents = output.len(), "loaded");
        Ok(output)
    }

    fn read(&self, filename: &str, chain: &str, path: &str) -> Result<Vec<u8>> {
        let fs = self.fs.as_deref().ok_or_else(|| Error::NoFilesystem {
            file: filename.to_string(),
            path: path.to_string(),
        })?;
        fs.read(filename).map_err(|source| Error::FileRead {
            file: filename.to_string(),
            chain: chain.to_string(),
            source,
        })
    }

    fn process_sequence(&self, ctx: &Context, items: &[Value]) -> Result<Value> {
        let mut result = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_ctx = ctx.append_path(&format!("[{}]", i));
            let expands = matches!(item, Value::Mapping(map) if self.registry.matches(map));
            match self.process_with_context(&item_ctx, item)? {
                Some(Value::Sequence(expanded)) if expands => result.extend(expanded),
                Some(value) => result.push(value),
                None => {}
            }
        }
        Ok(Value::Sequence(result))
    }

    /// Process every key of `block` into `output`, dropping omitted values.
    fn process_fields(&self, ctx: &Context, block: &Mapping, mut output: Mapping) -> Result<Option<Value>> {
        for (key, value) in block {
            if let Some(processed) = self.process_with_context(&ctx.append_path(key), value)? {
                output.insert(key.clone(), processed);
            }
        }
        Ok(Some(Value::Mapping(output)))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Config::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("syntax", &self.syntax)
            .field("fs", &self.fs.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

impl Processor for Engine {
    fn process_with_context(&self, ctx: &Context, value: &Value) -> Result<Option<Value>> {
        match value {
            Value::Mapping(map) => self.process_map_with_context(ctx, map),
            Value::Sequence(items) => self.process_sequence(ctx, items).map(Some),
            Value::String(s) => interpolate_value(&ctx.stack(), s, ctx.path()).map(Some),
            scalar => Ok(Some(scalar.clone())),
        }
    }

    fn process_map_with_context(&self, ctx: &Context, map: &Mapping) -> Result<Option<Value>> {
        if !self.registry.matches(map) {
            return self.process_fields(ctx, map, Mapping::new());
        }

        let mut block = map.clone();
        let mut output = Mapping::new();
        for (keyword, handler) in self.registry.iter() {
            let Some(value) = block.get(keyword).cloned() else {
                continue;
            };
            trace!(path = %ctx.path(), directive = keyword, "dispatching");
            let outcome = handler.handle(self, ctx, &block, &value)?;
            if outcome.consumed {
                return Ok(outcome.result);
            }
            block.shift_remove(keyword);
            match outcome.result {
                Some(Value::Mapping(entries)) => output.extend(entries),
                Some(other) => {
                    trace!(directive = keyword, kind = other.type_name(), "ignoring non-mapping contribution")
                }
                None => {}
            }
        }
        self.process_fields(ctx, &block, output)
    }

    #[tracing::instrument(level = "debug", skip(self, ctx, target), fields(path = %ctx.path()))]
    fn load_and_merge_file_with_context(
        &self,
        ctx: &Context,
        filename: &str,
        target: &mut Mapping,
    ) -> Result<()> {
        let chain = ctx.format_include_chain_with(filename);
        if ctx.include_chain().iter().any(|f| f == filename) {
            return Err(Error::IncludeCycle {
                file: filename.to_string(),
                chain,
            });
        }

        let bytes = self.read(filename, &chain, ctx.path())?;
        let doc = parse_yaml(&String::from_utf8_lossy(&bytes)).map_err(|source| Error::FileParse {
            file: filename.to_string(),
            chain: chain.clone(),
            source,
        })?;
        debug!(file = filename, chain = %chain, "including");

        let processed = self
            .process_with_context(&ctx.with_include(filename), &doc)
            .map_err(|err| Error::Composition {
                file: filename.to_string(),
                chain: chain.clone(),
                source: Box::new(err),
            })?;
        match processed {
            Some(Value::Mapping(map)) => merge(target, &map),
            None => {}
            Some(other) => {
                return Err(Error::type_mismatch(
                    format!("included file {} must produce a mapping, got {}", filename, other.type_name()),
                    ctx.path(),
                ));
            }
        }
        Ok(())
    }
}
