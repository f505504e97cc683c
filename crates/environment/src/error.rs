use capability::{CapabilityId, ResourceType, display_ids};
use thiserror::Error;

/// Environment construction errors.
///
/// Every variant is raised while an environment is being built, never while
/// a computation runs against one.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Some resource types have no registered default.
    #[error("no default registered for: {}", display_ids(.missing))]
    MissingDefault { missing: Vec<CapabilityId> },

    /// An explicit initializer left identities of the set uncovered.
    #[error("no initial value supplied for: {}", display_ids(.missing))]
    MissingResource { missing: Vec<CapabilityId> },

    /// An explicit initializer named an identity outside the set.
    #[error("initial value for capability outside the set: {0}")]
    UnexpectedResource(CapabilityId),

    /// An explicit initializer named the same identity twice.
    #[error("initial value supplied twice for: {0}")]
    DuplicateResource(CapabilityId),

    /// An initial value is not of the resource type the set expects.
    #[error("{id} expects a {expected} resource, got {found}")]
    TypeMismatch {
        id: CapabilityId,
        expected: ResourceType,
        found: ResourceType,
    },

    /// A config entry names no capability in the catalog.
    #[error("unknown capability in config: {0}")]
    UnknownCapability(String),

    /// Two capability types share one config name.
    #[error("capability name already registered for another type: {0}")]
    AmbiguousCapability(String),

    /// A config value does not decode into the resource type.
    #[error("invalid value for {capability}: {reason}")]
    Decode { capability: String, reason: String },

    /// The config is not valid TOML for an environment.
    #[error("failed to parse environment config: {0}")]
    Parse(String),

    /// Reading the config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
