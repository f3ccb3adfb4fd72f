//! The contract between the document walker and directive handlers.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::value::{Mapping, Value};

/// What a handler did with the block it was given.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    /// Replacement for the block when consumed, or entries to merge into
    /// the output when not. `None` omits the block.
    pub result: Option<Value>,
    /// The handler fully produced the node; no further processing happens.
    pub consumed: bool,
}

impl Outcome {
    /// The block is replaced by `value`.
    pub fn replace(value: Value) -> Self {
        Outcome {
            result: Some(value),
            consumed: true,
        }
    }

    /// The block disappears from the output.
    pub fn omit() -> Self {
        Outcome {
            result: None,
            consumed: true,
        }
    }

    /// Nothing to contribute; keep processing the block.
    pub fn proceed() -> Self {
        Outcome::default()
    }

    /// Contribute `entries` and keep processing the block.
    pub fn contribute(entries: Mapping) -> Self {
        Outcome {
            result: Some(Value::Mapping(entries)),
            consumed: false,
        }
    }
}

/// Recursion entry points handed to directive handlers.
pub trait Processor {
    /// Process any node. `None` means the node is omitted.
    fn process_with_context(&self, ctx: &Context, value: &Value) -> Result<Option<Value>>;

    fn process_map_with_context(&self, ctx: &Context, map: &Mapping) -> Result<Option<Value>>;

    /// Read, parse and process `filename`, then deep-merge the result into
    /// `target`.
    fn load_and_merge_file_with_context(
        &self,
        ctx: &Context,
        filename: &str,
        target: &mut Mapping,
    ) -> Result<()>;
}

/// A handler for one directive keyword.
///
/// `block` is the mapping that carries the keyword and `value` is the
/// keyword's value. Closures with the same signature implement this trait.
pub trait Directive: Send + Sync {
    fn handle(
        &self,
        processor: &dyn Processor,
        ctx: &Context,
        block: &Mapping,
        value: &Value,
    ) -> Result<Outcome>;
}

impl<F> Directive for F
where
    F: Fn(&dyn Processor, &Context, &Mapping, &Value) -> Result<Outcome> + Send + Sync,
{
    fn handle(
        &self,
        processor: &dyn Processor,
        ctx: &Context,
        block: &Mapping,
        value: &Value,
    ) -> Result<Outcome> {
        self(processor, ctx, block, value)
    }
}

/// Directive handlers keyed by keyword, consulted in registration order.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Vec<(String, Arc<dyn Directive>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `keyword`. Re-registering a keyword replaces
    /// its handler and keeps its position.
    pub fn register(&mut self, keyword: impl Into<String>, handler: Arc<dyn Directive>) {
        let keyword = keyword.into();
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some(entry) => entry.1 = handler,
            None => self.entries.push((keyword, handler)),
        }
    }

    pub fn get(&self, keyword: &str) -> Option<&Arc<dyn Directive>> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, handler)| handler)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Directive>)> {
        self.entries.iter().map(|(k, h)| (k.as_str(), h))
    }

    /// True when `map` carries at least one registered keyword.
    pub fn matches(&self, map: &Mapping) -> bool {
        self.entries.iter().any(|(k, _)| map.contains_key(k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keywords()).finish()
    }
}

/// Copy of `block` without `keyword`, preserving key order.
pub fn without_key(block: &Mapping, keyword: &str) -> Mapping {
    block
        .iter()
        .filter(|(k, _)| *k != keyword)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
