//! Dependency registry.
//!
//! Routes name the dependencies their action handler receives; the
//! registry builds them by name at dispatch time, in the order listed.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased dependency instance.
pub type Dependency = Arc<dyn Any + Send + Sync>;

type Factory = Arc<dyn Fn() -> Dependency + Send + Sync>;

/// Factories for named dependencies.
#[derive(Clone, Default)]
pub struct DependencyRegistry {
    factories: HashMap<String, Factory>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory producing a fresh instance per dispatch.
    pub fn register<T, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Arc::new(factory()) as Dependency);
        self.factories.insert(name.into(), factory);
        self
    }

    /// Register a single instance shared by every dispatch.
    pub fn shared<T>(&mut self, name: impl Into<String>, instance: Arc<T>) -> &mut Self
    where
        T: Any + Send + Sync,
    {
        let factory: Factory = Arc::new(move || instance.clone() as Dependency);
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build every named dependency in order.
    ///
    /// Returns the first unknown name as the error.
    pub fn resolve(&self, names: &[String]) -> Result<Dependencies, String> {
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let factory = self.factories.get(name).ok_or_else(|| name.clone())?;
            entries.push((name.clone(), factory()));
        }
        Ok(Dependencies { entries })
    }
}

impl fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("DependencyRegistry").field("names", &names).finish()
    }
}

/// Resolved dependencies handed to an action handler.
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: Vec<(String, Dependency)>,
}

impl Dependencies {
    /// The dependency registered as `name`, if it has type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, dep)| dep.as_ref().downcast_ref::<T>())
    }

    /// The dependency at `index` in route order, if it has type `T`.
    pub fn at<T: Any>(&self, index: usize) -> Option<&T> {
        self.entries
            .get(index)
            .and_then(|(_, dep)| dep.as_ref().downcast_ref::<T>())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct UserRepository {
        table: &'static str,
    }

    #[test]
    fn test_resolve_in_order() {
        let mut registry = DependencyRegistry::new();
        registry
            .register("User", || UserRepository { table: "users" })
            .register("Limit", || 25u32);

        let deps = registry.resolve(&["Limit".into(), "User".into()]).unwrap();
        assert_eq!(deps.names().collect::<Vec<_>>(), vec!["Limit", "User"]);
        assert_eq!(deps.at::<u32>(0), Some(&25));
        assert_eq!(deps.get::<UserRepository>("User").unwrap().table, "users");
        assert!(deps.get::<u32>("User").is_none());
    }

    #[test]
    fn test_unknown_dependency() {
        let registry = DependencyRegistry::new();
        assert_eq!(registry.resolve(&["Missing".into()]).unwrap_err(), "Missing");
        assert!(registry.resolve(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_factory_runs_per_resolve_shared_does_not() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();

        let mut registry = DependencyRegistry::new();
        registry.register("Fresh", move || counter.fetch_add(1, Ordering::SeqCst));
        registry.shared("Config", Arc::new(String::from("shared")));

        let names = vec!["Fresh".to_string(), "Config".to_string()];
        let first = registry.resolve(&names).unwrap();
        let second = registry.resolve(&names).unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_eq!(first.get::<String>("Config"), second.get::<String>("Config"));
        assert_eq!(second.at::<usize>(0), Some(&1));
    }
}
