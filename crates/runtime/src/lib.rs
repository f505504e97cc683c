//! Capability-tracked computations over a linear resource environment.
//!
//! This crate is the runtime core: it lets a function declare exactly which
//! capabilities it may touch, checks every composition against those
//! declarations before anything runs, and threads one exclusive
//! [`ResourceEnvironment`] through strictly ordered steps.
//!
//! # Overview
//!
//! - **Program**: a [`Computation`] bundled with the [`CapabilitySet`] it
//!   requires. Built inside a [`Scope`], which hands out handles only for
//!   capabilities in that set.
//! - **Cap / Linear**: handles to one capability slot. [`Cap`] is `Copy`
//!   and keeps the resource type fixed; [`Linear`] is threaded through
//!   results and may change the resource type ([`Linear::transition`]).
//! - **Computation**: a staged step, sequenced with
//!   [`Computation::and_then`]; steps run strictly in order.
//! - **Drivers**: [`run_pure`] for side-effect-free programs, [`run_in`] for
//!   any [`Context`]. Both reject an environment that does not match the
//!   program's set exactly, before the first step.
//!
//! # Example
//!
//! ```
//! use runtime::{CapabilitySet, Program, Resource, ResourceEnvironment, run_pure};
//!
//! runtime::capability!(Counter: u64);
//! runtime::label!(A);
//! runtime::label!(B);
//!
//! let set = CapabilitySet::builder()
//!     .labeled::<A, Counter>()
//!     .labeled::<B, Counter>()
//!     .build()?;
//!
//! let program = Program::new(set.clone(), |scope| {
//!     let a = scope.labeled::<A, Counter>()?;
//!     let b = scope.labeled::<B, Counter>()?;
//!     Ok(a.update(|n| n + 1)
//!         .then(b.update(|n| n + 10))
//!         .then(a.get().zip(b.get())))
//! })?;
//!
//! let env = ResourceEnvironment::explicit(
//!     &set,
//!     [
//!         Resource::new::<runtime::Labeled<A, Counter>>(1),
//!         Resource::new::<runtime::Labeled<B, Counter>>(0),
//!     ],
//! )?;
//! assert_eq!(run_pure(program, env)?, (2, 10));
//! # Ok::<(), runtime::Error>(())
//! ```

mod computation;
mod context;
mod driver;
mod error;
mod handle;
mod program;
mod scope;

pub use computation::Computation;
pub use context::{Context, Pure, Suspend, Transcript};
pub use driver::{Outcome, run_default, run_in, run_in_env, run_pure, run_pure_env};
pub use error::{Error, Result};
pub use handle::{Branch, Branched, Cap, Linear, Operation};
pub use program::Program;
pub use scope::Scope;

// Capability and environment types used throughout the API.
pub use capability::{
    Capability, CapabilityId, CapabilitySet, Label, Labeled, ResourceType, capability, label,
};
pub use environment::{Catalog, Defaults, EnvConfig, Resource, ResourceEnvironment};
