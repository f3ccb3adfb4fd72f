//! Recursive merging and sequence deduplication.
//!
//! Merge rules: two mappings merge key by key, two sequences concatenate,
//! anything else is overwritten by the source. Paths in statistics use
//! dotted notation (`server.ports`), with `[i]` for sequence elements.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::value::{Mapping, Value};

/// Deep-merge `source` into `target`.
pub fn merge(target: &mut Mapping, source: &Mapping) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Mapping(existing)), Value::Mapping(incoming)) => merge(existing, incoming),
            (Some(Value::Sequence(existing)), Value::Sequence(incoming)) => {
                existing.extend(incoming.iter().cloned())
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Accumulating merge that records, for every dotted path written, how many
/// times it was written and which distinct values it received.
#[derive(Debug, Clone, Default)]
pub struct MergeMap {
    data: Mapping,
    stats: IndexMap<String, usize>,
    distinct: IndexMap<String, Vec<Value>>,
}

impl MergeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, source: &Mapping) {
        let mut data = std::mem::take(&mut self.data);
        self.merge_into(&mut data, source, "");
        self.data = data;
    }

    fn merge_into(&mut self, target: &mut Mapping, source: &Mapping, prefix: &str) {
        for (key, value) in source {
            let path = join_path(prefix, key);
            self.record(&path, value);

            match (target.get_mut(key), value) {
                (Some(Value::Mapping(existing)), Value::Mapping(incoming)) => {
                    self.merge_into(existing, incoming, &path);
                }
                (Some(Value::Sequence(existing)), Value::Sequence(incoming)) => {
                    existing.extend(incoming.iter().cloned());
                }
                (_, Value::Mapping(incoming)) => {
                    self.record_nested(incoming, &path);
                    target.insert(key.clone(), value.clone());
                }
                _ => {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
    }

    fn record_nested(&mut self, source: &Mapping, prefix: &str) {
        for (key, value) in source {
            let path = join_path(prefix, key);
            self.record(&path, value);
            if let Value::Mapping(nested) = value {
                self.record_nested(nested, &path);
            }
        }
    }

    fn record(&mut self, path: &str, value: &Value) {
        *self.stats.entry(path.to_string()).or_default() += 1;
        let seen = self.distinct.entry(path.to_string()).or_default();
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }

    pub fn data(&self) -> &Mapping {
        &self.data
    }

    pub fn into_data(self) -> Mapping {
        self.data
    }

    /// Write count per dotted path.
    pub fn stats(&self) -> &IndexMap<String, usize> {
        &self.stats
    }

    /// Distinct values per dotted path, in first-seen order.
    pub fn distinct(&self) -> &IndexMap<String, Vec<Value>> {
        &self.distinct
    }
}

/// Removed-duplicate counts: path → rendered item → times removed.
pub type DedupStats = IndexMap<String, IndexMap<String, usize>>;

/// Remove later duplicates from every sequence in `value`, keeping the first
/// occurrence. Nested structures are deduplicated before their container is
/// compared.
pub fn deduplicate(value: &Value) -> Value {
    deduplicate_with_stats(value).0
}

/// [`deduplicate`], also reporting what was removed where.
pub fn deduplicate_with_stats(value: &Value) -> (Value, DedupStats) {
    let mut stats = DedupStats::new();
    let result = dedup_value(value, "", &mut stats);
    (result, stats)
}

fn dedup_value(value: &Value, path: &str, stats: &mut DedupStats) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), dedup_value(v, &join_path(path, k), stats)))
                .collect(),
        ),
        Value::Sequence(items) => {
            let mut seen = HashSet::new();
            let mut result = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item = dedup_value(item, &format!("{}[{}]", path, i), stats);
                if seen.insert(comparison_key(&item)) {
                    result.push(item);
                } else {
                    *stats
                        .entry(path.to_string())
                        .or_default()
                        .entry(describe(&item))
                        .or_default() += 1;
                }
            }
            Value::Sequence(result)
        }
        scalar => scalar.clone(),
    }
}

/// Canonical encoding: mapping keys sorted, strings quoted so `"1"` and `1`
/// stay distinct.
pub fn comparison_key(value: &Value) -> String {
    match value {
        Value::Mapping(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let entries: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{:?}:{}", k, comparison_key(&map[k])))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
        Value::Sequence(items) => {
            let entries: Vec<String> = items.iter().map(comparison_key).collect();
            format!("[{}]", entries.join(","))
        }
        Value::String(s) => format!("{:?}", s),
        scalar => scalar.to_string(),
    }
}

/// Readable form for statistics: `key=value` for one-field mappings.
fn describe(value: &Value) -> String {
    match value {
        Value::Mapping(map) if map.len() == 1 => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect(),
        Value::Mapping(_) | Value::Sequence(_) => comparison_key(value),
        scalar => scalar.to_string(),
    }
}
