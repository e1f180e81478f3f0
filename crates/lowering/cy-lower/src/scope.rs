//! Lexical scope stack used while lowering a translation unit

use log::trace;
use rustc_hash::FxHashMap;

/// A stack of name-to-value frames
///
/// Frames are pushed and popped in strict LIFO order. Lookups scan from the
/// innermost frame outwards, so a binding in an inner frame shadows outer
/// bindings of the same name until that frame is popped.
#[derive(Debug, Clone)]
pub struct ScopeStack<V> {
    frames: Vec<FxHashMap<String, V>>,
}

impl<V> ScopeStack<V> {
    /// Creates a stack with no frames
    #[must_use]
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Pushes an empty frame
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
        trace!("scope push -> depth {}", self.frames.len());
    }

    /// Pops the innermost frame, discarding its bindings
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty; unbalanced push/pop is a lowering bug.
    pub fn pop(&mut self) {
        assert!(!self.frames.is_empty(), "scope stack underflow");
        self.frames.pop();
        trace!("scope pop -> depth {}", self.frames.len());
    }

    /// Binds `name` in the innermost frame, replacing any binding it already holds there
    ///
    /// # Panics
    ///
    /// Panics if no frame has been pushed.
    pub fn bind(&mut self, name: impl Into<String>, value: V) {
        assert!(!self.frames.is_empty(), "bind outside of any scope");
        let top = self.frames.len() - 1;
        self.frames[top].insert(name.into(), value);
    }

    /// Nearest binding of `name`
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&V> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Number of frames currently pushed
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl<V> Default for ScopeStack<V> {
    fn default() -> Self {
        Self::new()
    }
}
