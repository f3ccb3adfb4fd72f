//! Built-in directive handlers.
//!
//! Each handler is constructed with the keyword it is registered under, so
//! renamed directives (see [`Syntax`]) strip the right key and report the
//! right location.

pub mod composition;
pub mod conditional;
pub mod discard;
pub mod iteration;
pub mod matrix;

use std::sync::Arc;

pub use composition::Composition;
pub use conditional::{Conditional, evaluate_condition, quote_unquoted_comparisons};
pub use discard::Discard;
pub use iteration::{ForLoopSpec, Iteration};
pub use matrix::{Matrix, MatrixSpec};

use crate::config::Syntax;
use crate::directive::Registry;

/// The built-in handlers under `syntax`'s keywords, in dispatch order:
/// `for`, `matrix`, `if`, `discard`, `include`, `embed`.
pub fn builtin(syntax: &Syntax) -> Registry {
    let mut registry = Registry::new();
    registry.register(&syntax.r#for, Arc::new(Iteration::new(&syntax.r#for)));
    registry.register(&syntax.matrix, Arc::new(Matrix::new(&syntax.matrix)));
    registry.register(&syntax.r#if, Arc::new(Conditional::new(&syntax.r#if)));
    registry.register(&syntax.discard, Arc::new(Discard::new(&syntax.discard)));
    registry.register(&syntax.include, Arc::new(Composition::new(&syntax.include)));
    registry.register(&syntax.embed, Arc::new(Composition::new(&syntax.embed)));
    registry
}

/// Recognized boolean spellings used by `if` and `discard`.
pub(crate) fn literal_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order() {
        let registry = builtin(&Syntax::default());
        let keywords: Vec<&str> = registry.keywords().collect();
        assert_eq!(keywords, ["for", "matrix", "if", "discard", "include", "embed"]);
    }

    #[test]
    fn builtin_uses_custom_keywords() {
        let syntax = Syntax {
            r#for: "each".into(),
            ..Syntax::default()
        };
        let registry = builtin(&syntax);
        assert!(registry.contains("each"));
        assert!(!registry.contains("for"));
    }
}
