//! Resource environments: the live values behind capabilities.
//!
//! A [`ResourceEnvironment`] maps every identity of one
//! [`CapabilitySet`](capability::CapabilitySet) to the value backing it, laid
//! out at the set's fixed offsets. Its key set is exactly that set, never a
//! superset or subset, which is checked once when it is built.
//!
//! # Construction
//!
//! - [`ResourceEnvironment::from_defaults`] asks a [`Defaults`] registry for
//!   a value of each resource type.
//! - [`ResourceEnvironment::explicit`] takes one [`Resource`] per identity.
//! - [`ResourceEnvironment::from_config`] decodes an [`EnvConfig`] through a
//!   [`Catalog`] and builds explicitly.
//!
//! # Example
//!
//! ```
//! use capability::CapabilitySet;
//! use environment::{Defaults, Resource, ResourceEnvironment};
//!
//! capability::capability!(pub Tag: u64);
//! capability::capability!(pub Leaves: u64);
//!
//! let set = CapabilitySet::builder().with::<Tag>().with::<Leaves>().build()?;
//!
//! let env = ResourceEnvironment::explicit(
//!     &set,
//!     [Resource::new::<Tag>(1), Resource::new::<Leaves>(0)],
//! )?;
//! assert_eq!(env.get::<Tag>(), Some(&1));
//!
//! let env = ResourceEnvironment::from_defaults(&set, &Defaults::standard())?;
//! assert_eq!(env.get::<Tag>(), Some(&0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod defaults;
mod environment;
mod error;
mod slot;

pub use config::{Catalog, EnvConfig, ResourceConfig};
pub use defaults::Defaults;
pub use environment::ResourceEnvironment;
pub use error::{Error, Result};
pub use slot::{Resource, Slot};
