//! `include` / `embed`: merge processed files into the current mapping.
//!
//! Files are merged left to right with deep-merge semantics, then the
//! block's own keys are processed on top, so siblings override included
//! values.

use crate::context::Context;
use crate::directive::{Directive, Outcome, Processor};
use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

#[derive(Debug, Clone)]
pub struct Composition {
    keyword: String,
}

impl Composition {
    pub fn new(keyword: impl Into<String>) -> Self {
        Composition {
            keyword: keyword.into(),
        }
    }
}

impl Directive for Composition {
    fn handle(
        &self,
        processor: &dyn Processor,
        ctx: &Context,
        _block: &Mapping,
        value: &Value,
    ) -> Result<Outcome> {
        let mut merged = Mapping::new();
        match value {
            Value::String(file) => processor.load_and_merge_file_with_context(ctx, file, &mut merged)?,
            Value::Sequence(files) => {
                for (i, entry) in files.iter().enumerate() {
                    let Value::String(file) = entry else {
                        return Err(Error::type_mismatch(
                            format!(
                                "{}[{}] must be a file name, got {}",
                                self.keyword,
                                i,
                                entry.type_name()
                            ),
                            ctx.directive_path(&self.keyword),
                        ));
                    };
                    processor.load_and_merge_file_with_context(ctx, file, &mut merged)?;
                }
            }
            other => {
                return Err(Error::type_mismatch(
                    format!(
                        "{} must be a string or list of strings, got {}",
                        self.keyword,
                        other.type_name()
                    ),
                    ctx.directive_path(&self.keyword),
                ));
            }
        }
        Ok(Outcome::contribute(merged))
    }
}
