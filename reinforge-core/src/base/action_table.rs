//! Ordered vocabulary of actions.
use super::Act;
use crate::error::ReinforgeError;
use std::collections::HashSet;

/// Immutable mapping from action index to action name.
///
/// The order of names defines the indices used by the policy network, so the
/// table is fixed once an environment is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionTable {
    names: Vec<String>,
}

impl ActionTable {
    /// Builds a table from names in index order.
    ///
    /// Fails on an empty list or duplicated names.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self, ReinforgeError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ReinforgeError::Config(
                "action table must have at least one action".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for name in names.iter() {
            if !seen.insert(name.as_str()) {
                return Err(ReinforgeError::Config(format!(
                    "duplicated action name {:?}",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    /// Builds a table of `n` actions named `action_0`, `action_1`, ...
    pub fn numbered(n: usize) -> Result<Self, ReinforgeError> {
        Self::new((0..n).map(|i| format!("action_{}", i)))
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false` for a successfully built table.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the given action, `None` if the index is out of range.
    pub fn name(&self, act: &Act) -> Option<&str> {
        self.names.get(act.0).map(String::as_str)
    }

    /// Index of the action with the given name.
    pub fn index_of(&self, name: &str) -> Option<Act> {
        self.names.iter().position(|n| n == name).map(Act)
    }

    /// Iterates over the names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = ActionTable::new(["append", "rename", "pad"]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.name(&Act(1)), Some("rename"));
        assert_eq!(table.name(&Act(3)), None);
        assert_eq!(table.index_of("pad"), Some(Act(2)));
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert!(ActionTable::new(Vec::<String>::new()).is_err());
        assert!(ActionTable::new(["a", "b", "a"]).is_err());
    }
}
