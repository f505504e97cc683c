use capability::{CapabilityId, CapabilitySet};
use thiserror::Error;

/// Runtime errors.
///
/// All of these are raised while a program is being put together or before
/// a driver runs its first step. A running computation never fails; handler
/// failures are part of each operation's own result type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A handle was requested for a capability outside the scope's set.
    #[error("capability not available: {0}")]
    Unavailable(CapabilityId),

    /// A capability would be reachable both linearly and through shared
    /// handles, or through two linear handles.
    #[error("capability already in use: {0}")]
    LinearConflict(CapabilityId),

    /// Programs holding linear handles cannot be invoked from another scope.
    #[error("program holds {0} linearly and cannot be embedded")]
    LinearNotEmbeddable(CapabilityId),

    /// The environment handed to a driver does not match the program.
    #[error("environment {found} does not match program capabilities {expected}")]
    EnvironmentMismatch {
        expected: CapabilitySet,
        found: CapabilitySet,
    },

    #[error(transparent)]
    Capability(#[from] capability::Error),

    #[error(transparent)]
    Environment(#[from] environment::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
