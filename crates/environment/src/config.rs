//! Environment configuration loaded from TOML.
//!
//! ```toml
//! [[resource]]
//! capability = "Tag"
//! value = 1
//!
//! [[resource]]
//! capability = "Counter"
//! label = "Left"
//! value = 0
//! ```

use crate::{Error, Resource, Result};
use capability::{Capability, CapabilityId, ResourceType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::path::Path;

/// Explicit initial values for an environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvConfig {
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceConfig>,
}

/// Initial value of one capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Capability kind name.
    pub capability: String,

    /// Label qualifying the kind, if any.
    #[serde(default)]
    pub label: Option<String>,

    pub value: toml::Value,
}

impl ResourceConfig {
    fn display_name(&self) -> String {
        match &self.label {
            Some(label) => format!("{label}:{}", self.capability),
            None => self.capability.clone(),
        }
    }
}

impl EnvConfig {
    /// Load an environment config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse an environment config from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }
}

type Decoder =
    Box<dyn Fn(toml::Value) -> std::result::Result<Box<dyn Any>, toml::de::Error> + Send + Sync>;

struct CatalogEntry {
    id: CapabilityId,
    resource: ResourceType,
    decode: Decoder,
}

/// Capabilities that can be initialized from config, by name.
#[derive(Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `C` nameable in configs.
    ///
    /// Registering `C` again replaces its decoder. Fails if another
    /// capability type already uses the same kind and label names.
    pub fn register<C>(&mut self) -> Result<&mut Self>
    where
        C: Capability,
        C::Resource: DeserializeOwned,
    {
        let id = C::id();
        if self
            .entries
            .iter()
            .any(|entry| entry.id != id && entry.id.matches(id.kind(), id.label()))
        {
            return Err(Error::AmbiguousCapability(id.to_string()));
        }

        self.entries.retain(|entry| entry.id != id);
        self.entries.push(CatalogEntry {
            id,
            resource: ResourceType::of::<C::Resource>(),
            decode: Box::new(|value| {
                value
                    .try_into::<C::Resource>()
                    .map(|resource| Box::new(resource) as Box<dyn Any>)
            }),
        });
        Ok(self)
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<C>(mut self) -> Result<Self>
    where
        C: Capability,
        C::Resource: DeserializeOwned,
    {
        self.register::<C>()?;
        Ok(self)
    }

    /// Turn one config entry into an initial value.
    pub fn decode(&self, config: &ResourceConfig) -> Result<Resource> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.id.matches(&config.capability, config.label.as_deref()))
            .ok_or_else(|| Error::UnknownCapability(config.display_name()))?;

        let value = (entry.decode)(config.value.clone()).map_err(|e| Error::Decode {
            capability: config.display_name(),
            reason: e.to_string(),
        })?;

        Ok(Resource::erased(entry.id, entry.resource, value))
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResourceEnvironment;
    use capability::{CapabilitySet, Labeled};
    use std::io::Write;

    capability::capability!(Tag: u64);
    capability::capability!(Counter: i64);
    capability::capability!(Names: Vec<String> = "names");
    capability::label!(Left);
    capability::label!(Right);

    mod shadow {
        capability::capability!(pub Tag: String);
    }

    fn catalog() -> Catalog {
        Catalog::new()
            .with::<Tag>()
            .and_then(Catalog::with::<Names>)
            .and_then(Catalog::with::<Labeled<Left, Counter>>)
            .and_then(Catalog::with::<Labeled<Right, Counter>>)
            .unwrap()
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[[resource]]
capability = "Tag"
value = 1

[[resource]]
capability = "Counter"
label = "Left"
value = -3

[[resource]]
capability = "names"
value = ["Jim", "Alice"]
"#;
        let config = EnvConfig::parse(toml).unwrap();
        assert_eq!(config.resources.len(), 3);

        let set = CapabilitySet::builder()
            .with::<Tag>()
            .labeled::<Left, Counter>()
            .with::<Names>()
            .build()
            .unwrap();
        let env = ResourceEnvironment::from_config(&set, &catalog(), &config).unwrap();

        assert_eq!(env.get::<Tag>(), Some(&1));
        assert_eq!(env.get::<Labeled<Left, Counter>>(), Some(&-3));
        assert_eq!(
            env.get::<Names>(),
            Some(&vec!["Jim".to_string(), "Alice".to_string()])
        );
    }

    #[test]
    fn test_unknown_capability() {
        let config =
            EnvConfig::parse("[[resource]]\ncapability = \"Counter\"\nvalue = 1\n").unwrap();
        let set = CapabilitySet::builder().with::<Tag>().build().unwrap();
        let err = ResourceEnvironment::from_config(&set, &catalog(), &config).unwrap_err();
        assert!(matches!(err, Error::UnknownCapability(name) if name == "Counter"));
    }

    #[test]
    fn test_bad_value() {
        let config =
            EnvConfig::parse("[[resource]]\ncapability = \"Tag\"\nvalue = \"one\"\n").unwrap();
        let set = CapabilitySet::builder().with::<Tag>().build().unwrap();
        let err = ResourceEnvironment::from_config(&set, &catalog(), &config).unwrap_err();
        assert!(matches!(err, Error::Decode { capability, .. } if capability == "Tag"));
    }

    #[test]
    fn test_config_must_match_set() {
        let config = EnvConfig::parse(
            "[[resource]]\ncapability = \"Counter\"\nlabel = \"Right\"\nvalue = 0\n",
        )
        .unwrap();
        let set = CapabilitySet::builder()
            .labeled::<Left, Counter>()
            .labeled::<Right, Counter>()
            .build()
            .unwrap();
        let err = ResourceEnvironment::from_config(&set, &catalog(), &config).unwrap_err();
        assert!(matches!(err, Error::MissingResource { .. }));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            EnvConfig::parse("[[resource]]\nvalue = 1\n"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[resource]]\ncapability = \"Tag\"\nvalue = 5").unwrap();

        let config = EnvConfig::load(file.path()).unwrap();
        let set = CapabilitySet::builder().with::<Tag>().build().unwrap();
        let env = ResourceEnvironment::from_config(&set, &catalog(), &config).unwrap();
        assert_eq!(env.get::<Tag>(), Some(&5));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            EnvConfig::load("/nonexistent/env.toml"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_register_rejects_name_collision() {
        let mut catalog = catalog();
        let err = catalog.register::<shadow::Tag>().unwrap_err();
        assert!(matches!(err, Error::AmbiguousCapability(name) if name == "Tag"));

        let nested = catalog.register::<Labeled<Left, Labeled<Right, Counter>>>();
        assert!(matches!(nested, Err(Error::AmbiguousCapability(_))));
    }

    #[test]
    fn test_register_same_type_again() {
        let mut catalog = catalog();
        catalog.register::<Tag>().unwrap();

        let config = EnvConfig::parse("[[resource]]\ncapability = \"Tag\"\nvalue = 2\n").unwrap();
        let set = CapabilitySet::builder().with::<Tag>().build().unwrap();
        let env = ResourceEnvironment::from_config(&set, &catalog, &config).unwrap();
        assert_eq!(env.get::<Tag>(), Some(&2));
    }
}
