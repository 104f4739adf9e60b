use std::collections::HashMap;

use super::Value;

/// Variable bindings for one evaluation.
///
/// Keys are case-sensitive. A name that is not bound is a lookup failure,
/// never an implicit zero or `false`. The evaluator only reads from an
/// environment; callers rebuild it from their own state for each request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Bind `name` to `value` (mutable reference version).
    pub fn insert(&mut self, name: &str, value: Value) -> Option<Value> {
        self.values.insert(name.to_owned(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names whose binding differs between `self` and `other`, including
    /// names bound in only one of them. Sorted for stable output.
    #[must_use]
    pub fn changed_names(&self, other: &Environment) -> Vec<String> {
        let mut changed: Vec<String> = self
            .values
            .iter()
            .filter(|(name, value)| other.values.get(name.as_str()) != Some(*value))
            .map(|(name, _)| name.clone())
            .collect();
        changed.extend(
            other
                .values
                .keys()
                .filter(|name| !self.values.contains_key(name.as_str()))
                .cloned(),
        );
        changed.sort();
        changed
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Environment {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.values
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}
