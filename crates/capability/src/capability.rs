//! Capability kinds, labels and their runtime identities.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::any::{TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;

/// A capability kind: an operation family together with the resource it manipulates.
///
/// Kinds are zero-sized marker types. The [`capability!`](crate::capability!) macro
/// generates one:
///
/// ```
/// capability::capability!(pub Counter: u64);
///
/// use capability::Capability;
/// assert_eq!(Counter::NAME, "Counter");
/// ```
pub trait Capability: 'static {
    /// Value backing the capability when an environment is constructed.
    type Resource: 'static;

    /// Display name of the kind, also used by environment configs.
    const NAME: &'static str;

    /// Label qualifying this identity, if any.
    fn label() -> Option<&'static str> {
        None
    }

    /// Runtime identity of this capability.
    fn id() -> CapabilityId {
        CapabilityId::of::<Self>()
    }
}

/// Opaque disambiguating identity for multiple instances of one capability kind.
pub trait Label: 'static {
    const NAME: &'static str;
}

/// Compound identity `(L, C)`.
///
/// Has the same resource type as `C` but is a different identity from `C`
/// and from `C` under any other label, so it always addresses its own slot.
pub struct Labeled<L, C>(PhantomData<fn() -> (L, C)>);

impl<L: Label, C: Capability> Capability for Labeled<L, C> {
    type Resource = C::Resource;
    const NAME: &'static str = C::NAME;

    fn label() -> Option<&'static str> {
        Some(L::NAME)
    }
}

/// Runtime identity of a (possibly labeled) capability.
///
/// Ordered by label, then kind name, which fixes the slot layout of a
/// [`CapabilitySet`](crate::CapabilitySet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityId {
    label: Option<&'static str>,
    kind: &'static str,
    type_id: TypeId,
}

impl CapabilityId {
    pub fn of<C: Capability + ?Sized>() -> Self {
        Self {
            label: C::label(),
            kind: C::NAME,
            type_id: TypeId::of::<C>(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn label(&self) -> Option<&'static str> {
        self.label
    }

    /// Whether this identity names the given capability type.
    pub fn is<C: Capability>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }

    /// Match against config-style names.
    pub fn matches(&self, kind: &str, label: Option<&str>) -> bool {
        self.kind == kind && self.label == label
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{label}:{}", self.kind),
            None => f.write_str(self.kind),
        }
    }
}

impl Serialize for CapabilityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CapabilityId", 2)?;
        state.serialize_field("kind", self.kind)?;
        state.serialize_field("label", &self.label)?;
        state.end()
    }
}

/// The Rust type of the value currently backing a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceType {
    type_id: TypeId,
    name: &'static str,
}

impl ResourceType {
    pub fn of<R: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<R>(),
            name: type_name::<R>(),
        }
    }

    pub fn is<R: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<R>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declare a capability kind.
///
/// `capability!(pub Tag: u64)` names the kind `"Tag"`;
/// `capability!(pub Tag: u64 = "tag")` overrides the name.
#[macro_export]
macro_rules! capability {
    ($(#[$meta:meta])* $vis:vis $name:ident : $resource:ty = $display:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::Capability for $name {
            type Resource = $resource;
            const NAME: &'static str = $display;
        }
    };
    ($(#[$meta:meta])* $vis:vis $name:ident : $resource:ty) => {
        $crate::capability!($(#[$meta])* $vis $name: $resource = stringify!($name));
    };
}

/// Declare a label type.
#[macro_export]
macro_rules! label {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::Label for $name {
            const NAME: &'static str = stringify!($name);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::capability!(Counter: u64);
    crate::capability!(Buffer: Vec<u8> = "buffer");
    crate::label!(Left);
    crate::label!(Right);

    #[test]
    fn test_labels_make_distinct_identities() {
        let plain = Counter::id();
        let left = Labeled::<Left, Counter>::id();
        let right = Labeled::<Right, Counter>::id();

        assert_ne!(plain, left);
        assert_ne!(left, right);
        assert_eq!(left, CapabilityId::of::<Labeled<Left, Counter>>());
        assert_eq!(left.kind(), "Counter");
        assert_eq!(left.label(), Some("Left"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Buffer::id().to_string(), "buffer");
        assert_eq!(Labeled::<Right, Buffer>::id().to_string(), "Right:buffer");
    }

    #[test]
    fn test_matches_config_names() {
        let id = Labeled::<Left, Counter>::id();
        assert!(id.matches("Counter", Some("Left")));
        assert!(!id.matches("Counter", None));
        assert!(id.is::<Labeled<Left, Counter>>());
        assert!(!id.is::<Counter>());
    }

    #[test]
    fn test_resource_type() {
        let ty = ResourceType::of::<u64>();
        assert!(ty.is::<u64>());
        assert!(!ty.is::<u32>());
        assert_eq!(ty.name(), "u64");
    }

    #[test]
    fn test_serialize_id() {
        let json = serde_json::to_value(Labeled::<Left, Counter>::id()).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "Counter", "label": "Left" }));
    }
}
