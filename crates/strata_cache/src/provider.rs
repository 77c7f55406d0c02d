//! Lazily built configuration backed by a [`ConfigCache`].

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::Serialize;
use strata_resource::{CacheState, ResourcesContainer};

use crate::config_cache::ConfigCache;
use crate::container::ConfigContainer;
use crate::error::CacheError;

type Producer<T> = Box<dyn Fn(&mut ResourcesContainer) -> T>;

/// Serves a configuration value from memory, from its cache file, or by
/// running the producer, in that order.
///
/// The producer receives a [`ResourcesContainer`] and registers every
/// resource its result depends on; those are persisted next to the cache in
/// debug mode. Values are stored as JSON inside the artifact.
pub struct ConfigProvider<T> {
    cache: ConfigCache,
    producer: Producer<T>,
    config: Option<T>,
}

impl<T> ConfigProvider<T>
where
    T: ConfigContainer + Serialize + DeserializeOwned,
{
    /// Creates a provider caching into `path`.
    pub fn new<F>(path: impl Into<PathBuf>, debug: bool, producer: F) -> Self
    where
        F: Fn(&mut ResourcesContainer) -> T + 'static,
    {
        Self {
            cache: ConfigCache::new(path, debug),
            producer: Box::new(producer),
            config: None,
        }
    }

    /// Returns the cache file path.
    pub fn path(&self) -> &Path {
        self.cache.path()
    }

    /// Adds another state this provider's cache depends on.
    pub fn add_dependency(&mut self, dependency: impl CacheState + 'static) {
        self.cache.add_dependency(dependency);
    }

    /// Returns `true` if the cache tracks its dependencies (debug mode).
    pub fn is_cache_changeable(&self) -> bool {
        self.cache.is_debug()
    }

    /// Returns the cache file's modification time, or `None` if nothing is
    /// cached.
    pub fn cache_timestamp(&self) -> Option<SystemTime> {
        self.cache.timestamp()
    }

    /// Returns the configuration, loading or building it on first use.
    pub fn get_config(&mut self) -> Result<&T, CacheError> {
        let config = match self.config.take() {
            Some(config) => config,
            None => self.load()?,
        };
        Ok(self.config.insert(config))
    }

    /// Deletes the cache file and forgets the in-memory value.
    pub fn clear_cache(&mut self) -> Result<(), CacheError> {
        self.config = None;
        self.cache.clear()
    }

    /// Rebuilds and persists the cache, discarding whatever was there.
    ///
    /// The new value is not kept in memory; the next [`get_config`] reads it
    /// back from the cache file.
    ///
    /// [`get_config`]: Self::get_config
    pub fn warm_up_cache(&mut self) -> Result<(), CacheError> {
        self.config = None;
        self.build().map(drop)
    }

    /// Rebuilds and persists the cache only when it is not fresh.
    pub fn ensure_cache_warmed_up(&mut self) -> Result<(), CacheError> {
        if self.cache.is_fresh() {
            return Ok(());
        }
        self.warm_up_cache()
    }

    fn load(&self) -> Result<T, CacheError> {
        if self.cache.is_fresh() {
            if let Some(config) = self.read_cached() {
                tracing::debug!(path = %self.path().display(), "config loaded from cache");
                return Ok(config);
            }
        }
        self.build()
    }

    fn read_cached(&self) -> Option<T> {
        let payload = self.cache.read()?;
        match serde_json::from_slice::<T>(&payload) {
            Ok(config) if config.is_container() => Some(config),
            Ok(_) => {
                tracing::debug!(path = %self.path().display(), "cached config is not a container");
                None
            }
            Err(e) => {
                tracing::debug!(path = %self.path().display(), error = %e, "cached config does not decode");
                None
            }
        }
    }

    fn build(&self) -> Result<T, CacheError> {
        let mut resources = ResourcesContainer::new();
        let config = (self.producer)(&mut resources);
        if !config.is_container() {
            return Err(CacheError::InvalidConfig {
                path: self.path().to_path_buf(),
            });
        }

        match self.persist(&config, &resources) {
            Ok(()) => tracing::debug!(
                path = %self.path().display(),
                resources = resources.len(),
                "config built"
            ),
            Err(CacheError::Serialization { reason }) => {
                tracing::warn!(
                    path = %self.path().display(),
                    %reason,
                    "config cannot be cached, serving it uncached"
                );
                self.cache.clear()?;
            }
            Err(e) => return Err(e),
        }
        Ok(config)
    }

    fn persist(&self, config: &T, resources: &ResourcesContainer) -> Result<(), CacheError> {
        let payload = serde_json::to_vec(config).map_err(CacheError::serialization)?;
        self.cache.write(&payload, resources.resources())
    }
}

/// Fresh when the cache exists, was written no later than `timestamp`, and
/// in debug mode its own dependencies are fresh.
impl<T> CacheState for ConfigProvider<T> {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        match self.cache.timestamp() {
            Some(cached) if cached <= timestamp => !self.cache.is_debug() || self.cache.is_fresh(),
            _ => false,
        }
    }
}

impl<T> std::fmt::Debug for ConfigProvider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("cache", &self.cache)
            .field("loaded", &self.config.is_some())
            .finish()
    }
}
