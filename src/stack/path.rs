use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Split a path expression into segments.
///
/// `a.b[2].c` becomes `["a", "b", "2", "c"]`. Bracketed segments may be
/// quoted (`a['x.y']`, `a["k"]`), in which case the quotes are removed and
/// the contents kept whole. Empty segments are dropped. An unclosed `[` is
/// kept as a literal character.
pub fn split_path(expr: &str) -> Vec<String> {
    let expr = expr.trim();
    let mut parts = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, parts: &mut Vec<String>| {
        let segment = current.trim();
        if !segment.is_empty() {
            parts.push(segment.to_string());
        }
        current.clear();
    };

    let mut rest = expr;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '.' => {
                flush(&mut current, &mut parts);
                rest = &rest[1..];
            }
            '[' => match rest.find(']') {
                Some(close) => {
                    flush(&mut current, &mut parts);
                    let inside = strip_quotes(rest[1..close].trim());
                    if !inside.is_empty() {
                        parts.push(inside.to_string());
                    }
                    rest = &rest[close + 1..];
                }
                None => {
                    current.push('[');
                    rest = &rest[1..];
                }
            },
            other => {
                current.push(other);
                rest = &rest[other.len_utf8()..];
            }
        }
    }
    flush(&mut current, &mut parts);
    parts
}

fn strip_quotes(s: &str) -> &str {
    let quoted = s.len() >= 2
        && ((s.starts_with('\'') && s.ends_with('\'')) || (s.starts_with('"') && s.ends_with('"')));
    if quoted { &s[1..s.len() - 1] } else { s }
}

/// Bounded cache of split path expressions.
///
/// Owned by a processor and shared by every stack it creates. Entries are
/// never evicted; once `capacity` distinct expressions are cached, further
/// expressions are split on every call.
#[derive(Debug)]
pub struct PathCache {
    entries: RwLock<HashMap<String, Arc<[String]>>>,
    capacity: usize,
}

impl PathCache {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PathCache {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn split(&self, expr: &str) -> Arc<[String]> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(parts) = entries.get(expr) {
            return Arc::clone(parts);
        }
        drop(entries);

        let parts: Arc<[String]> = split_path(expr).into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() < self.capacity {
            entries
                .entry(expr.to_string())
                .or_insert_with(|| Arc::clone(&parts));
        }
        parts
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_dots_and_brackets() {
        assert_eq!(split_path("a.b[2].c"), vec!["a", "b", "2", "c"]);
        assert_eq!(split_path("config['log.level']"), vec!["config", "log.level"]);
        assert_eq!(split_path("m[\"key\"]"), vec!["m", "key"]);
        assert_eq!(split_path(" a..b. "), vec!["a", "b"]);
        assert_eq!(split_path("a[0"), vec!["a[0"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn cache_stops_growing_at_capacity() {
        let cache = PathCache::with_capacity(2);
        cache.split("a.b");
        cache.split("c.d");
        cache.split("e.f");
        assert_eq!(cache.len(), 2);
        assert_eq!(&*cache.split("e.f"), &["e".to_string(), "f".to_string()]);
        assert_eq!(cache.len(), 2);
    }
}
