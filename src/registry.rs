use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::request::ActionType;

/// An explicit `ActionType -> T` mapping filled at startup.
///
/// Once handed to an [`ActionExecutor`](crate::ActionExecutor) the registry
/// is only read, so it can be shared freely across threads.
pub struct Registry<T: ?Sized> {
    entries: BTreeMap<ActionType, Arc<T>>,
}

impl<T: ?Sized> Registry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers `entry` for `action_type`, returning the entry it replaced.
    pub fn register(&mut self, action_type: ActionType, entry: Arc<T>) -> Option<Arc<T>> {
        self.entries.insert(action_type, entry)
    }

    /// Looks up the entry for `action_type`.
    pub fn get(&self, action_type: ActionType) -> Option<&Arc<T>> {
        self.entries.get(&action_type)
    }

    /// Returns `true` if an entry exists for `action_type`.
    pub fn contains(&self, action_type: ActionType) -> bool {
        self.entries.contains_key(&action_type)
    }

    /// Iterates the registered action types in order.
    pub fn action_types(&self) -> impl Iterator<Item = ActionType> + '_ {
        self.entries.keys().copied()
    }

    /// Number of registered action types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.action_types()).finish()
    }
}
