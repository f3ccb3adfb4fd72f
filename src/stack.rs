//! Scoped variable resolution.
//!
//! A [`Stack`] is an ordered list of frames. The bottom frame holds the root
//! variables, and directives such as `for` and `matrix` push a frame per
//! generated item. Bare names resolve from the top frame down; dotted and
//! bracketed paths (`job.env[0].name`) resolve their first segment that way
//! and then walk mappings by key and sequences by index.

mod object;
mod path;

use std::fmt;
use std::sync::Arc;

pub use object::{FieldResolver, SerdeObject};
pub use path::{PathCache, split_path};

use crate::output::to_json;
use crate::value::{Mapping, Value};

pub struct Stack {
    frames: Vec<Mapping>,
    root_object: Option<Arc<dyn FieldResolver>>,
    paths: Arc<PathCache>,
}

impl Stack {
    /// A stack whose bottom frame is `root`, with its own path cache.
    pub fn new(root: Mapping) -> Self {
        Self::with_cache(root, Arc::new(PathCache::new()))
    }

    /// A stack sharing an existing path cache.
    pub fn with_cache(root: Mapping, paths: Arc<PathCache>) -> Self {
        Stack {
            frames: vec![root],
            root_object: None,
            paths,
        }
    }

    /// Attach a typed object consulted when a name is bound in no frame.
    pub fn with_root_object(mut self, object: Arc<dyn FieldResolver>) -> Self {
        self.root_object = Some(object);
        self
    }

    pub fn push(&mut self, frame: Mapping) {
        self.frames.push(frame);
    }

    pub fn push_empty(&mut self) {
        self.push(Mapping::new());
    }

    /// Remove the top frame. Popping the last frame leaves a fresh empty
    /// one, so the stack never becomes empty.
    pub fn pop(&mut self) -> Mapping {
        if self.frames.len() == 1 {
            return std::mem::take(&mut self.frames[0]);
        }
        self.frames.pop().unwrap_or_default()
    }

    /// Bind `key` in the top frame.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(key.into(), value);
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn path_cache(&self) -> &Arc<PathCache> {
        &self.paths
    }

    /// Bare-name lookup, top frame first. A binding to null is found.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .cloned()
            .or_else(|| self.root_object.as_ref().and_then(|o| o.field(name)))
    }

    /// Resolve a dotted/bracketed path.
    ///
    /// Any broken link makes the whole path unresolved: a missing key, an
    /// out-of-range index, descending into a scalar, or a null anywhere along
    /// a multi-segment path.
    pub fn resolve(&self, expr: &str) -> Option<Value> {
        if !expr.contains(['.', '[']) {
            return self.lookup(expr.trim());
        }

        let parts = self.paths.split(expr);
        let (first, rest) = parts.split_first()?;
        let root = self.lookup(first)?;
        if root.is_null() {
            return None;
        }

        let mut current = &root;
        for segment in rest {
            current = step(current, segment)?;
            if current.is_null() {
                return None;
            }
        }
        Some(current.clone())
    }

    pub fn get_string(&self, expr: &str) -> Option<String> {
        match self.resolve(expr)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            v @ (Value::Sequence(_) | Value::Mapping(_)) => Some(to_json(&v)),
            other => Some(other.to_string()),
        }
    }

    pub fn get_int(&self, expr: &str) -> Option<i64> {
        match self.resolve(expr)? {
            Value::Integer(n) => Some(n),
            Value::Float(n) => Some(n.trunc() as i64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_slice(&self, expr: &str) -> Option<Vec<Value>> {
        match self.resolve(expr)? {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn get_map(&self, expr: &str) -> Option<Mapping> {
        match self.resolve(expr)? {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Every visible binding, flattened bottom to top (upper frames win).
    /// Root object fields fill in names no frame binds.
    pub fn all(&self) -> Mapping {
        let mut result = self
            .root_object
            .as_ref()
            .map(|object| object.fields())
            .unwrap_or_default();
        for frame in &self.frames {
            for (key, value) in frame {
                result.insert(key.clone(), value.clone());
            }
        }
        result
    }

    /// Independent copy of the frames, sharing the path cache and root object.
    pub fn copy(&self) -> Self {
        Stack {
            frames: self.frames.clone(),
            root_object: self.root_object.clone(),
            paths: Arc::clone(&self.paths),
        }
    }
}

fn step<'v>(current: &'v Value, segment: &str) -> Option<&'v Value> {
    match current {
        Value::Mapping(map) => map.get(segment),
        Value::Sequence(seq) => segment.parse::<usize>().ok().and_then(|i| seq.get(i)),
        _ => None,
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new(Mapping::new())
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("frames", &self.frames)
            .field("root_object", &self.root_object.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pairs: &[(&str, Value)]) -> Mapping {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn upper_frames_shadow_lower() {
        let mut stack = Stack::new(frame(&[("x", Value::Integer(1)), ("y", Value::Integer(2))]));
        stack.push(frame(&[("x", Value::Integer(10))]));
        assert_eq!(stack.lookup("x"), Some(Value::Integer(10)));
        assert_eq!(stack.lookup("y"), Some(Value::Integer(2)));
        stack.pop();
        assert_eq!(stack.lookup("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn popping_last_frame_leaves_empty_frame() {
        let mut stack = Stack::new(frame(&[("x", Value::Integer(1))]));
        stack.pop();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.lookup("x"), None);
        stack.set("y", Value::Boolean(true));
        assert_eq!(stack.lookup("y"), Some(Value::Boolean(true)));
    }

    #[test]
    fn null_breaks_dotted_paths_but_not_bare_names() {
        let stack = Stack::new(frame(&[
            ("n", Value::Null),
            ("m", Value::Mapping(frame(&[("k", Value::Null)]))),
        ]));
        assert_eq!(stack.resolve("n"), Some(Value::Null));
        assert_eq!(stack.resolve("n.x"), None);
        assert_eq!(stack.resolve("m.k"), None);
    }

    #[test]
    fn all_flattens_with_top_winning() {
        let mut stack = Stack::new(frame(&[("a", Value::Integer(1)), ("b", Value::Integer(1))]));
        stack.push(frame(&[("b", Value::Integer(2))]));
        let all = stack.all();
        assert_eq!(all["a"], Value::Integer(1));
        assert_eq!(all["b"], Value::Integer(2));
    }

    #[test]
    fn typed_getters_coerce() {
        let stack = Stack::new(frame(&[
            ("ratio", Value::Float(2.9)),
            ("count", Value::from(" 42 ")),
            ("word", Value::from("many")),
            ("tags", Value::Sequence(vec![Value::Integer(1), Value::from("a")])),
            ("meta", Value::Mapping(frame(&[("on", Value::Boolean(true))]))),
            ("none", Value::Null),
        ]));

        assert_eq!(stack.get_int("ratio"), Some(2));
        assert_eq!(stack.get_int("count"), Some(42));
        assert_eq!(stack.get_int("word"), None);
        assert_eq!(stack.get_int("meta"), None);

        assert_eq!(stack.get_string("ratio").as_deref(), Some("2.9"));
        assert_eq!(stack.get_string("tags").as_deref(), Some(r#"[1,"a"]"#));
        assert_eq!(stack.get_string("meta").as_deref(), Some(r#"{"on":true}"#));

        assert_eq!(stack.get_slice("tags").map(|s| s.len()), Some(2));
        assert_eq!(stack.get_slice("meta"), None);
        assert_eq!(stack.get_map("meta.on"), None);
        assert!(stack.get_map("meta").is_some_and(|m| m.contains_key("on")));
    }

    #[test]
    fn typed_getters_miss_on_null_or_absent() {
        let stack = Stack::new(frame(&[("none", Value::Null)]));
        assert_eq!(stack.get_string("none"), None);
        assert_eq!(stack.get_int("none"), None);
        assert_eq!(stack.get_slice("none"), None);
        assert_eq!(stack.get_map("none"), None);
        assert_eq!(stack.get_string("absent"), None);
        assert_eq!(stack.get_int("absent.deeper"), None);
    }
}
