//! The linear store of live resource values.

use crate::{Catalog, Defaults, EnvConfig, Error, Resource, Result, Slot};
use capability::{Capability, CapabilityId, CapabilitySet};
use tracing::{debug, warn};

/// Mapping from capability identity to its live resource.
///
/// The key set is always exactly one [`CapabilitySet`]: slot `i` holds the
/// identity at offset `i` of that set. Drivers take environments by value,
/// so a running computation is the only holder of mutation rights.
#[derive(Debug, Default)]
pub struct ResourceEnvironment {
    layout: CapabilitySet,
    slots: Vec<Slot>,
}

impl ResourceEnvironment {
    /// Environment for the empty capability set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an environment from registered defaults.
    ///
    /// Fails before building anything if any identity's resource type has no
    /// default; the error names all such identities.
    pub fn from_defaults(set: &CapabilitySet, defaults: &Defaults) -> Result<Self> {
        let missing: Vec<CapabilityId> = set
            .iter()
            .filter(|entry| !defaults.contains(&entry.resource))
            .map(|entry| entry.id)
            .collect();
        if !missing.is_empty() {
            warn!(capabilities = %set, "default construction failed");
            return Err(Error::MissingDefault { missing });
        }

        let mut resources = Vec::with_capacity(set.len());
        for entry in set {
            let value = defaults
                .make(&entry.resource)
                .ok_or(Error::MissingDefault {
                    missing: vec![entry.id],
                })?;
            resources.push(Resource::erased(entry.id, entry.resource, value));
        }

        Self::explicit(set, resources)
    }

    /// Build an environment from an exact list of initial values.
    ///
    /// The list must cover precisely the identities of `set`: a missing,
    /// extra, duplicated or mistyped entry fails construction.
    pub fn explicit(
        set: &CapabilitySet,
        resources: impl IntoIterator<Item = Resource>,
    ) -> Result<Self> {
        let mut slots: Vec<Option<Slot>> =
            std::iter::repeat_with(|| None).take(set.len()).collect();

        for resource in resources {
            let id = resource.id();
            let offset = set.offset(&id).ok_or(Error::UnexpectedResource(id))?;
            let expected = set.resource_type(&id).ok_or(Error::UnexpectedResource(id))?;
            if expected != resource.resource_type() {
                return Err(Error::TypeMismatch {
                    id,
                    expected,
                    found: resource.resource_type(),
                });
            }
            if slots[offset].is_some() {
                return Err(Error::DuplicateResource(id));
            }
            slots[offset] = Some(Slot::from_resource(resource));
        }

        let missing: Vec<CapabilityId> = slots
            .iter()
            .zip(set.ids())
            .filter(|(slot, _)| slot.is_none())
            .map(|(_, id)| id)
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingResource { missing });
        }

        debug!(capabilities = %set, "resource environment constructed");
        Ok(Self {
            layout: set.clone(),
            slots: slots.into_iter().flatten().collect(),
        })
    }

    /// Build an environment from a parsed config file.
    pub fn from_config(set: &CapabilitySet, catalog: &Catalog, config: &EnvConfig) -> Result<Self> {
        let resources = config
            .resources
            .iter()
            .map(|entry| catalog.decode(entry))
            .collect::<Result<Vec<_>>>()?;
        Self::explicit(set, resources)
    }

    /// The current capability set, including any resource types changed
    /// by transitions since construction.
    pub fn capabilities(&self) -> CapabilitySet {
        let mut set = self.layout.clone();
        for slot in &self.slots {
            set.retype(&slot.id(), slot.resource_type());
        }
        set
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current value of a capability whose resource type has not changed.
    pub fn get<C: Capability>(&self) -> Option<&C::Resource> {
        self.get_as::<C, C::Resource>()
    }

    /// Current value of a capability, read as `R`.
    pub fn get_as<C: Capability, R: 'static>(&self) -> Option<&R> {
        let offset = self.layout.offset(&C::id())?;
        self.slots[offset].get()
    }

    pub fn slot(&self, offset: usize) -> Option<&Slot> {
        self.slots.get(offset)
    }

    /// All slots, in offset order.
    ///
    /// Exclusive access: whoever holds this borrow holds the only mutation
    /// rights over the environment.
    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }
}
