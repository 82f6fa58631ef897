use crate::domain::method::MethodKey;
use crate::error::{CheckoutError, Result};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// Builds a strategy instance. Called at most once per registered key.
///
/// Factories compose collaborators but must not perform I/O; that belongs in
/// the strategy's `initialize`.
pub type StrategyFactory<S> = Box<dyn Fn() -> Arc<S> + Send + Sync>;

struct Entry<S: ?Sized> {
    factory: StrategyFactory<S>,
    instance: OnceLock<Arc<S>>,
}

/// Lazily constructs and memoizes one strategy per key.
///
/// `S` is usually a strategy trait object (`dyn PaymentStrategy`). Duplicate
/// registration is rejected with [`CheckoutError::Configuration`] rather than
/// shadowing the earlier factory. Entries are never evicted.
pub struct Registry<S: ?Sized, K = MethodKey> {
    entries: RwLock<HashMap<K, Arc<Entry<S>>>>,
}

impl<S: ?Sized, K> Default for Registry<S, K> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<S, K> Registry<S, K>
where
    S: ?Sized,
    K: Eq + Hash + Clone + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, key: K, factory: F) -> Result<()>
    where
        F: Fn() -> Arc<S> + Send + Sync + 'static,
    {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(&key) {
            return Err(CheckoutError::Configuration {
                key: key.to_string(),
            });
        }

        debug!(method = %key, "registered strategy factory");
        entries.insert(
            key,
            Arc::new(Entry {
                factory: Box::new(factory),
                instance: OnceLock::new(),
            }),
        );
        Ok(())
    }

    /// Returns the instance for `key`, building it on first use.
    ///
    /// Every call after the first returns the same `Arc`. Concurrent first
    /// calls from different threads still run the factory only once.
    pub fn get(&self, key: &K) -> Result<Arc<S>> {
        let entry = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            entries
                .get(key)
                .cloned()
                .ok_or_else(|| CheckoutError::NotFound {
                    key: key.to_string(),
                })?
        };

        let instance = entry.instance.get_or_init(|| {
            debug!(method = %key, "constructing strategy");
            (entry.factory)()
        });
        Ok(Arc::clone(instance))
    }

    pub fn contains(&self, key: &K) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<K> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.keys().cloned().collect()
    }
}
