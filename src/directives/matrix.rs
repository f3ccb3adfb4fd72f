//! `matrix`: expand a block once per combination of dimension values.
//!
//! ```yaml
//! matrix:
//!   os: [linux, windows]
//!   arch: [x86_64, arm64]
//!   exclude:
//!     - {os: windows, arch: arm64}
//!   include:
//!     - {os: macos, arch: arm64}
//! name: "build-${os}-${arch}"
//! ```
//!
//! Sequence-valued keys are dimensions and scalar keys are constants set on
//! every job. Dimensions combine in name order with the last one varying
//! fastest. A job matches an `exclude` or `include` entry when it carries
//! every key of the entry with an equal value. Excludes drop every job they
//! match, includes are merged into every job they match or appended as a new
//! job when nothing matches. Finally every job carries the same keys, with
//! null for missing ones.

use indexmap::IndexMap;

use crate::context::Context;
use crate::directive::{Directive, Outcome, Processor, without_key};
use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

const INCLUDE: &str = "include";
const EXCLUDE: &str = "exclude";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixSpec {
    pub dimensions: IndexMap<String, Vec<Value>>,
    pub variables: Mapping,
    pub include: Vec<Mapping>,
    pub exclude: Vec<Mapping>,
}

impl MatrixSpec {
    /// Parse a `matrix` value; `path` locates errors.
    pub fn parse(value: &Value, path: &str) -> Result<Self> {
        let Value::Mapping(map) = value else {
            return Err(Error::type_mismatch(
                format!("matrix must be a mapping, got {}", value.type_name()),
                path,
            ));
        };

        let mut spec = MatrixSpec::default();
        for (key, value) in map {
            match (key.as_str(), value) {
                (INCLUDE, v) => spec.include = job_list(INCLUDE, v, path)?,
                (EXCLUDE, v) => spec.exclude = job_list(EXCLUDE, v, path)?,
                (_, Value::Sequence(values)) => {
                    spec.dimensions.insert(key.clone(), values.clone());
                }
                (_, Value::Mapping(_)) => {
                    return Err(Error::type_mismatch(
                        format!("matrix key '{}' must be a sequence or scalar, got mapping", key),
                        path,
                    ));
                }
                (_, scalar) => {
                    spec.variables.insert(key.clone(), scalar.clone());
                }
            }
        }
        Ok(spec)
    }

    /// The jobs this matrix produces, in order.
    pub fn expand(&self) -> Vec<Mapping> {
        let mut jobs = self.product();
        jobs.retain(|job| !self.exclude.iter().any(|spec| job_matches(job, spec)));

        for spec in &self.include {
            let mut matched = false;
            for job in jobs.iter_mut().filter(|job| job_matches(job, spec)) {
                matched = true;
                for (k, v) in spec {
                    job.insert(k.clone(), v.clone());
                }
            }
            if !matched {
                jobs.push(spec.clone());
            }
        }

        for job in &mut jobs {
            for (k, v) in &self.variables {
                job.insert(k.clone(), v.clone());
            }
        }

        let mut keys: Vec<&String> = Vec::new();
        for job in &jobs {
            for k in job.keys() {
                if !keys.contains(&k) {
                    keys.push(k);
                }
            }
        }
        let keys: Vec<String> = keys.into_iter().cloned().collect();
        for job in &mut jobs {
            for k in &keys {
                job.entry(k.clone()).or_insert(Value::Null);
            }
        }
        jobs
    }

    /// Cartesian product of the dimensions, sorted by name, last one
    /// varying fastest.
    fn product(&self) -> Vec<Mapping> {
        let mut names: Vec<&String> = self.dimensions.keys().collect();
        names.sort();
        let columns: Vec<&Vec<Value>> = names.iter().map(|n| &self.dimensions[*n]).collect();
        if columns.is_empty() || columns.iter().any(|c| c.is_empty()) {
            return Vec::new();
        }

        let mut jobs = Vec::new();
        let mut indices = vec![0usize; columns.len()];
        loop {
            jobs.push(
                names
                    .iter()
                    .zip(&columns)
                    .zip(&indices)
                    .map(|((name, column), &i)| ((*name).clone(), column[i].clone()))
                    .collect(),
            );

            let mut position = indices.len();
            loop {
                if position == 0 {
                    return jobs;
                }
                position -= 1;
                indices[position] += 1;
                if indices[position] < columns[position].len() {
                    break;
                }
                indices[position] = 0;
            }
        }
    }
}

fn job_list(name: &str, value: &Value, path: &str) -> Result<Vec<Mapping>> {
    let Value::Sequence(items) = value else {
        return Err(Error::syntax(
            format!("matrix {} must be a sequence, got {}", name, value.type_name()),
            path,
        ));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Mapping(job) => Ok(job.clone()),
            other => Err(Error::syntax(
                format!("matrix {}[{}] must be a mapping, got {}", name, i, other.type_name()),
                path,
            )),
        })
        .collect()
}

/// True when `job` carries every key of `spec` with an equal value.
fn job_matches(job: &Mapping, spec: &Mapping) -> bool {
    spec.iter()
        .all(|(k, v)| job.get(k).is_some_and(|existing| existing.loose_eq(v)))
}

#[derive(Debug, Clone)]
pub struct Matrix {
    keyword: String,
}

impl Matrix {
    pub fn new(keyword: impl Into<String>) -> Self {
        Matrix {
            keyword: keyword.into(),
        }
    }
}

impl Directive for Matrix {
    fn handle(
        &self,
        processor: &dyn Processor,
        ctx: &Context,
        block: &Mapping,
        value: &Value,
    ) -> Result<Outcome> {
        let spec = MatrixSpec::parse(value, &ctx.directive_path(&self.keyword))?;
        let jobs = spec.expand();
        tracing::debug!(path = %ctx.path(), jobs = jobs.len(), "matrix expanded");

        let template = without_key(block, &self.keyword);
        let mut results = Vec::with_capacity(jobs.len());
        for (index, job) in jobs.into_iter().enumerate() {
            let _scope = ctx.push_scope(job);
            let job_ctx = ctx.append_path(&format!("[{}]", index));
            if let Some(expanded) = processor.process_map_with_context(&job_ctx, &template)? {
                results.push(expanded);
            }
        }
        Ok(Outcome::replace(Value::Sequence(results)))
    }
}
