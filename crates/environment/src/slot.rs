//! Type-erased resource cells.

use capability::{Capability, CapabilityId, ResourceType};
use std::any::Any;
use std::fmt;

/// Live value backing one capability.
///
/// Carries the identity it belongs to and the Rust type of the value it
/// currently holds, which changes when a lifecycle capability transitions.
pub struct Slot {
    id: CapabilityId,
    resource: ResourceType,
    value: Box<dyn Any>,
}

impl Slot {
    pub(crate) fn from_resource(resource: Resource) -> Self {
        Self {
            id: resource.id,
            resource: resource.resource,
            value: resource.value,
        }
    }

    pub fn id(&self) -> CapabilityId {
        self.id
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource
    }

    pub fn get<R: 'static>(&self) -> Option<&R> {
        self.value.downcast_ref()
    }

    pub fn get_mut<R: 'static>(&mut self) -> Option<&mut R> {
        self.value.downcast_mut()
    }

    /// Move the value out, leaving the slot empty until [`store`](Self::store).
    ///
    /// Returns `None` and leaves the slot untouched if it does not hold an `R`.
    pub fn take<R: 'static>(&mut self) -> Option<R> {
        if !self.resource.is::<R>() {
            return None;
        }
        let value = std::mem::replace(&mut self.value, Box::new(()));
        match value.downcast::<R>() {
            Ok(value) => {
                self.resource = ResourceType::of::<()>();
                Some(*value)
            }
            Err(value) => {
                self.value = value;
                None
            }
        }
    }

    /// Replace the value, possibly with one of a different type.
    pub fn store<R: 'static>(&mut self, value: R) {
        self.value = Box::new(value);
        self.resource = ResourceType::of::<R>();
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

/// An `(identity, value)` pair used to build an environment explicitly.
pub struct Resource {
    id: CapabilityId,
    resource: ResourceType,
    value: Box<dyn Any>,
}

impl Resource {
    pub fn new<C: Capability>(value: C::Resource) -> Self {
        Self {
            id: C::id(),
            resource: ResourceType::of::<C::Resource>(),
            value: Box::new(value),
        }
    }

    pub(crate) fn erased(id: CapabilityId, resource: ResourceType, value: Box<dyn Any>) -> Self {
        Self {
            id,
            resource,
            value,
        }
    }

    pub fn id(&self) -> CapabilityId {
        self.id
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    capability::capability!(Door: bool);

    #[test]
    fn test_take_and_store_retype_the_slot() {
        let mut slot = Slot::from_resource(Resource::new::<Door>(true));
        assert_eq!(slot.get::<bool>(), Some(&true));

        assert_eq!(slot.take::<String>(), None);
        assert_eq!(slot.get::<bool>(), Some(&true));

        assert_eq!(slot.take::<bool>(), Some(true));
        slot.store(String::from("open"));

        assert!(slot.resource_type().is::<String>());
        assert_eq!(slot.get::<String>().map(String::as_str), Some("open"));
        assert_eq!(slot.id(), Door::id());
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut slot = Slot::from_resource(Resource::new::<Door>(false));
        *slot.get_mut::<bool>().unwrap() = true;
        assert_eq!(slot.get::<bool>(), Some(&true));
    }
}
