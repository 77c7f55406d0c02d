//! Shapes a cached configuration value may take.

use std::collections::{BTreeMap, HashMap};

/// A configuration value that is a collection.
///
/// Typed collections always qualify. Dynamic values are only containers when
/// they hold an array or an object; a producer returning anything else is a
/// programming error reported as [`CacheError::InvalidConfig`].
///
/// [`CacheError::InvalidConfig`]: crate::CacheError::InvalidConfig
pub trait ConfigContainer {
    /// Returns `true` if this value has a container shape.
    fn is_container(&self) -> bool {
        true
    }
}

impl<T> ConfigContainer for Vec<T> {}

impl<K, V> ConfigContainer for BTreeMap<K, V> {}

impl<K, V, S> ConfigContainer for HashMap<K, V, S> {}

impl ConfigContainer for serde_json::Value {
    fn is_container(&self) -> bool {
        self.is_array() || self.is_object()
    }
}
