//! Registry of resource types with a default value.

use capability::ResourceType;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

type Factory = Box<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Resource types with a registered default value.
///
/// Consulted only by
/// [`ResourceEnvironment::from_defaults`](crate::ResourceEnvironment::from_defaults).
/// Keyed by resource type, so every capability backed by the same type
/// (labeled instances included) shares one default.
#[derive(Default)]
pub struct Defaults {
    factories: HashMap<ResourceType, Factory>,
}

impl Defaults {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard scalar and string types.
    pub fn standard() -> Self {
        Self::new()
            .with::<()>()
            .with::<bool>()
            .with::<u8>()
            .with::<u16>()
            .with::<u32>()
            .with::<u64>()
            .with::<usize>()
            .with::<i8>()
            .with::<i16>()
            .with::<i32>()
            .with::<i64>()
            .with::<isize>()
            .with::<String>()
    }

    /// Register `R::default()`.
    pub fn register<R: Default + 'static>(&mut self) -> &mut Self {
        self.register_with(R::default)
    }

    /// Register a custom default.
    pub fn register_with<R, F>(&mut self, factory: F) -> &mut Self
    where
        R: 'static,
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.factories.insert(
            ResourceType::of::<R>(),
            Box::new(move || Box::new(factory()) as Box<dyn Any>),
        );
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<R: Default + 'static>(mut self) -> Self {
        self.register::<R>();
        self
    }

    pub fn contains(&self, resource: &ResourceType) -> bool {
        self.factories.contains_key(resource)
    }

    pub(crate) fn make(&self, resource: &ResourceType) -> Option<Box<dyn Any>> {
        self.factories.get(resource).map(|factory| factory())
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.factories.keys().map(ResourceType::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_scalars() {
        let defaults = Defaults::standard();
        assert!(defaults.contains(&ResourceType::of::<u64>()));
        assert!(defaults.contains(&ResourceType::of::<String>()));
        assert!(!defaults.contains(&ResourceType::of::<Vec<u8>>()));
    }

    #[test]
    fn test_custom_default_overrides() {
        let mut defaults = Defaults::standard();
        defaults.register_with(|| 7u64);

        let value = defaults.make(&ResourceType::of::<u64>()).unwrap();
        assert_eq!(value.downcast_ref::<u64>(), Some(&7));
    }
}
