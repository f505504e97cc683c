//! Capability error types.

use crate::CapabilityId;
use thiserror::Error;

/// Capability errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The same identity was declared twice in one set.
    #[error("duplicate capability: {0}")]
    Duplicate(CapabilityId),

    /// A set is not contained in the set it was checked against.
    #[error("capabilities not available: {}", display_ids(.missing))]
    NotSubset { missing: Vec<CapabilityId> },
}

/// Comma-separated identities, as used in error messages.
pub fn display_ids(ids: &[CapabilityId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
