//! Builder for configuring [`MokaRegistry`].

use crate::registry::MokaRegistry;

const DEFAULT_INITIAL_CAPACITY: usize = 64;

/// Builder for creating and configuring a [`MokaRegistry`].
///
/// Use [`MokaRegistry::builder`] to create a new builder instance.
///
/// ```
/// use offbox_moka::MokaRegistry;
///
/// let registry = MokaRegistry::builder()
///     .initial_capacity(256)
///     .build();
/// # let _ = registry;
/// ```
#[derive(Debug, Clone)]
pub struct MokaRegistryBuilder {
    initial_capacity: usize,
}

impl MokaRegistryBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Number of entries each new store pre-allocates room for.
    ///
    /// This is a sizing hint, not a limit: stores never evict by size.
    pub fn initial_capacity(self, initial_capacity: usize) -> Self {
        Self { initial_capacity }
    }

    /// Builds the registry.
    pub fn build(self) -> MokaRegistry {
        MokaRegistry::with_capacity(self.initial_capacity)
    }
}

impl Default for MokaRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
