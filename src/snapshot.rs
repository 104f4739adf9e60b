//! Variable snapshot extraction: turning caller state into an
//! [`Environment`] for one gate refresh.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::types::{Environment, Value};

/// Anything that can produce the variables for an evaluation.
///
/// Implementations take a fresh snapshot on every call; the engine never
/// writes back into the source.
pub trait VariableSource {
    fn snapshot(&self) -> Environment;
}

impl VariableSource for Environment {
    fn snapshot(&self) -> Environment {
        self.clone()
    }
}

impl<S: BuildHasher> VariableSource for HashMap<String, Value, S> {
    fn snapshot(&self) -> Environment {
        self.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

impl VariableSource for BTreeMap<String, Value> {
    fn snapshot(&self) -> Environment {
        self.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

impl<T: VariableSource + ?Sized> VariableSource for &T {
    fn snapshot(&self) -> Environment {
        (**self).snapshot()
    }
}

/// A JSON profile. Numbers and booleans become variables; nested objects
/// are flattened with `_` (`{"market": {"size": 600}}` binds
/// `market_size`). Strings, arrays and nulls are skipped.
#[cfg(feature = "json")]
impl VariableSource for serde_json::Value {
    fn snapshot(&self) -> Environment {
        let mut env = Environment::new();
        if let serde_json::Value::Object(map) = self {
            flatten_into(&mut env, None, map);
        }
        env
    }
}

#[cfg(feature = "json")]
fn flatten_into(
    env: &mut Environment,
    prefix: Option<&str>,
    map: &serde_json::Map<String, serde_json::Value>,
) {
    use serde_json::Value as Json;

    for (key, value) in map {
        let name = match prefix {
            Some(prefix) => format!("{prefix}_{key}"),
            None => key.clone(),
        };
        match value {
            Json::Number(n) => {
                if let Some(n) = n.as_f64() {
                    env.insert(&name, Value::Number(n));
                }
            }
            Json::Bool(b) => {
                env.insert(&name, Value::Bool(*b));
            }
            Json::Object(inner) => flatten_into(env, Some(&name), inner),
            Json::String(_) | Json::Array(_) | Json::Null => {}
        }
    }
}
