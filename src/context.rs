use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::stack::Stack;
use crate::value::Mapping;

/// Per-node processing state threaded through the walker.
///
/// Derived contexts share one [`Stack`] and carry their own path and include
/// chain, so a child never changes what its parent reports.
#[derive(Debug, Clone)]
pub struct Context {
    stack: Rc<RefCell<Stack>>,
    path: String,
    include_chain: Vec<String>,
}

impl Context {
    pub fn new(stack: Stack) -> Self {
        Context {
            stack: Rc::new(RefCell::new(stack)),
            path: String::new(),
            include_chain: Vec::new(),
        }
    }

    pub fn stack(&self) -> Ref<'_, Stack> {
        self.stack.borrow()
    }

    pub fn stack_mut(&self) -> RefMut<'_, Stack> {
        self.stack.borrow_mut()
    }

    /// Diagnostic location, e.g. `services[0].env`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Location of a directive key on the current node, e.g. `jobs.for`.
    pub fn directive_path(&self, directive: &str) -> String {
        if self.path.is_empty() {
            directive.to_string()
        } else {
            format!("{}.{}", self.path, directive)
        }
    }

    pub fn include_chain(&self) -> &[String] {
        &self.include_chain
    }

    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Context {
            stack: Rc::clone(&self.stack),
            path: path.into(),
            include_chain: self.include_chain.clone(),
        }
    }

    /// Extend the path: index segments (`[2]`) attach directly, keys are
    /// joined with a dot.
    pub fn append_path(&self, segment: &str) -> Self {
        let path = if self.path.is_empty() {
            segment.to_string()
        } else if segment.starts_with('[') {
            format!("{}{}", self.path, segment)
        } else {
            format!("{}.{}", self.path, segment)
        };
        self.with_path(path)
    }

    /// Enter an included file: the chain grows and the path restarts at the
    /// new document's root.
    pub fn with_include(&self, file: impl Into<String>) -> Self {
        let mut include_chain = self.include_chain.clone();
        include_chain.push(file.into());
        Context {
            stack: Rc::clone(&self.stack),
            path: String::new(),
            include_chain,
        }
    }

    /// `a.yaml -> b.yaml -> c.yaml`, empty outside of includes.
    pub fn format_include_chain(&self) -> String {
        self.include_chain.join(" -> ")
    }

    /// The chain as it would read after entering `file`.
    pub fn format_include_chain_with(&self, file: &str) -> String {
        let mut chain = self.format_include_chain();
        if !chain.is_empty() {
            chain.push_str(" -> ");
        }
        chain.push_str(file);
        chain
    }

    /// Push `frame` onto the shared stack until the guard is dropped.
    pub fn push_scope(&self, frame: Mapping) -> ScopeGuard {
        self.stack.borrow_mut().push(frame);
        ScopeGuard {
            stack: Rc::clone(&self.stack),
        }
    }
}

/// Pops the frame pushed by [`Context::push_scope`] when dropped, including
/// on early return through `?`.
#[must_use = "the scope is popped as soon as the guard is dropped"]
pub struct ScopeGuard {
    stack: Rc<RefCell<Stack>>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}
