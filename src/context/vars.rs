use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use super::lock;

/// Request-scoped scratch values, last write wins.
#[derive(Default)]
pub struct Vars {
    values: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        lock(&self.values).insert(name.into(), Box::new(value));
    }

    /// Returns a clone of the value under `name` if it is a `T`.
    pub fn get_opt<T: Any + Clone>(&self, name: &str) -> Option<T> {
        lock(&self.values)
            .get(name)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Returns the value under `name`, or `default` if unset or not a `T`.
    pub fn get<T: Any + Clone>(&self, name: &str, default: T) -> T {
        self.get_opt(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.values).contains_key(name)
    }

    /// Removes `name`, returning whether it was set.
    pub fn remove(&self, name: &str) -> bool {
        lock(&self.values).remove(name).is_some()
    }
}

impl fmt::Debug for Vars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = lock(&self.values);
        f.debug_set().entries(values.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let vars = Vars::new();
        vars.set("x", 1);

        assert_eq!(vars.get("x", 0), 1);
        assert_eq!(vars.get("y", 0), 0);
    }

    #[test]
    fn test_last_write_wins_across_types() {
        let vars = Vars::new();
        vars.set("user", 7u32);
        vars.set("user", "alice".to_string());

        assert_eq!(vars.get_opt::<u32>("user"), None);
        assert_eq!(vars.get("user", String::new()), "alice");
    }

    #[test]
    fn test_remove() {
        let vars = Vars::new();
        vars.set("flash", vec!["saved"]);

        assert!(vars.contains("flash"));
        assert!(vars.remove("flash"));
        assert!(!vars.remove("flash"));
        assert!(vars.get_opt::<Vec<&str>>("flash").is_none());
    }
}
