use serde::{Deserialize, Serialize};

use crate::ast::Value;

/// Key of a condition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Key {
    /// `age`, `age[>]`, `AND`, `OR #2`
    Named(String),
    /// Non-string key; its value is a pre-rendered fragment
    Positional(usize),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Named(name) => write!(f, "{}", name),
            Key::Positional(n) => write!(f, "#{}", n),
        }
    }
}

/// Value side of a condition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Leaf comparison operand
    Leaf(Value),
    /// Associative sub-expression under a combinator key
    Group(Conditions),
    /// List of sub-expressions under a combinator key
    Groups(Vec<Conditions>),
}

/// An ordered condition expression.
///
/// Entries are kept in insertion order; compilation never reorders them.
///
/// ```
/// use sqlcage::ast::Conditions;
///
/// let cond = Conditions::new()
///     .with("age[>]", 18)
///     .group("OR", Conditions::new().with("role", "admin").with("role", "mod"));
/// assert_eq!(cond.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub entries: Vec<(Key, Node)>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf comparison (`"age[>]"`, `18`).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .push((Key::Named(key.into()), Node::Leaf(value.into())));
        self
    }

    /// Add a nested group under a combinator key (`"AND"`, `"OR #1"`).
    pub fn group(mut self, key: impl Into<String>, group: Conditions) -> Self {
        self.entries.push((Key::Named(key.into()), Node::Group(group)));
        self
    }

    /// Add a list of sub-expressions under a combinator key.
    pub fn groups(mut self, key: impl Into<String>, groups: Vec<Conditions>) -> Self {
        self.entries
            .push((Key::Named(key.into()), Node::Groups(groups)));
        self
    }

    /// Add a pre-rendered SQL fragment under the next positional key.
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        let index = self
            .entries
            .iter()
            .filter(|(k, _)| matches!(k, Key::Positional(_)))
            .count();
        self.entries
            .push((Key::Positional(index), Node::Leaf(Value::Raw(sql.into()))));
        self
    }

    /// Append an entry as-is.
    pub fn push(&mut self, key: Key, node: Node) {
        self.entries.push((key, node));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Key, Node)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_keys_are_numbered() {
        let cond = Conditions::new()
            .raw("1 = 1")
            .with("a", 1)
            .raw("2 = 2");
        let keys: Vec<_> = cond.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![Key::Positional(0), Key::Named("a".into()), Key::Positional(1)]
        );
    }
}
