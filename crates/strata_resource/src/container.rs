//! The collector a cache producer records its dependencies into.

use crate::resource::Resource;

/// Mutable accumulator of the resources touched while building a value.
///
/// A producer receives one of these, registers every resource its result
/// depends on, and the cache persists them next to the artifact.
#[derive(Debug, Clone, Default)]
pub struct ResourcesContainer {
    resources: Vec<Resource>,
}

impl ResourcesContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resource, keeping registration order.
    pub fn add_resource(&mut self, resource: impl Into<Resource>) {
        self.resources.push(resource.into());
    }

    /// Returns the resources recorded so far.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Returns the number of recorded resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Consumes the container, yielding the recorded resources.
    pub fn into_resources(self) -> Vec<Resource> {
        self.resources
    }
}
