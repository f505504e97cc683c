//! Capability identities and capability sets.
//!
//! Core principle: **a computation may only reach the resources its
//! capability set names.**
//!
//! A capability kind is a marker type implementing [`Capability`]; the
//! [`capability!`] macro declares one. Several instances of one kind are told
//! apart with [`Label`]s, which qualify a kind into the compound identity
//! [`Labeled<L, C>`]. A [`CapabilitySet`] is the duplicate-free, ordered set of
//! identities available at a program point; its order fixes the slot offsets
//! environments use.
//!
//! # Example
//!
//! ```
//! use capability::{Capability, CapabilitySet, Labeled};
//!
//! capability::capability!(pub Counter: u64);
//! capability::label!(pub Left);
//!
//! let outer = CapabilitySet::builder()
//!     .with::<Counter>()
//!     .labeled::<Left, Counter>()
//!     .build()?;
//! let inner = CapabilitySet::builder().labeled::<Left, Counter>().build()?;
//!
//! assert!(outer.admits(&inner).is_allowed());
//! assert_eq!(outer.offset(&Labeled::<Left, Counter>::id()), Some(1));
//! # Ok::<(), capability::Error>(())
//! ```

mod capability;
mod error;
mod set;

pub use capability::{Capability, CapabilityId, Label, Labeled, ResourceType};
pub use error::{Error, Result, display_ids};
pub use set::{Builder, CapabilitySet, Decision, Entry};
