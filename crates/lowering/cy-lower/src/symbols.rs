//! Session-wide function symbol table

use crate::{LowerError, RedefinitionPolicy};
use cy_ir::FunctionRef;
use indexmap::IndexMap;

/// Maps function names to their IR handles across every source unit of a session
#[derive(Debug, Default, Clone)]
pub struct FunctionTable {
    functions: IndexMap<String, FunctionRef>,
}

impl FunctionTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a function by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FunctionRef> {
        self.functions.get(name)
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Checks whether `name` may be (re)defined under `policy`
    ///
    /// # Errors
    ///
    /// Returns [`LowerError::Redefinition`] when the name exists and the policy rejects it.
    pub fn check_definition(&self, name: &str, policy: RedefinitionPolicy) -> Result<(), LowerError> {
        match policy {
            RedefinitionPolicy::Reject if self.contains(name) => Err(LowerError::Redefinition {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Registers a function, replacing any previous entry of the same name
    pub fn insert(&mut self, function: FunctionRef) {
        self.functions.insert(function.name().to_string(), function);
    }

    /// Registered functions in first-registration order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionRef> {
        self.functions.values()
    }

    /// Number of registered functions
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
