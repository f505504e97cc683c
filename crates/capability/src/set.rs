//! Capability sets and the subset rule used for composition checking.

use crate::error::display_ids;
use crate::{Capability, CapabilityId, Error, Label, Labeled, ResourceType, Result};
use std::fmt;

/// One member of a [`CapabilitySet`]: an identity and the type backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    pub id: CapabilityId,
    pub resource: ResourceType,
}

impl Entry {
    pub fn of<C: Capability>() -> Self {
        Self {
            id: C::id(),
            resource: ResourceType::of::<C::Resource>(),
        }
    }
}

/// Set of capability identities usable at a program point.
///
/// Entries are kept sorted by identity and never repeat one. The position of
/// an entry is the fixed slot offset of that identity in any environment
/// built for this set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    entries: Vec<Entry>,
}

/// Result of checking one set against another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { missing: Vec<CapabilityId> },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny { missing } => Err(Error::NotSubset { missing }),
        }
    }
}

impl CapabilitySet {
    /// The set with no capabilities.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Build a set from entries in any order.
    ///
    /// Fails if any identity occurs more than once.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        let mut entries: Vec<Entry> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some(pair) = entries.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(Error::Duplicate(pair[0].id));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = CapabilityId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// Slot offset of an identity.
    pub fn offset(&self, id: &CapabilityId) -> Option<usize> {
        self.entries.binary_search_by(|entry| entry.id.cmp(id)).ok()
    }

    pub fn contains(&self, id: &CapabilityId) -> bool {
        self.offset(id).is_some()
    }

    pub fn entry(&self, offset: usize) -> Option<&Entry> {
        self.entries.get(offset)
    }

    pub fn resource_type(&self, id: &CapabilityId) -> Option<ResourceType> {
        self.offset(id).map(|offset| self.entries[offset].resource)
    }

    /// Check whether a computation requiring `inner` may run in a context
    /// holding `self`.
    ///
    /// Every identity of `inner` must be present here with the same resource
    /// type. A labeled identity is never satisfied by the unlabeled one.
    pub fn admits(&self, inner: &CapabilitySet) -> Decision {
        let missing: Vec<CapabilityId> = inner
            .iter()
            .filter(|entry| self.resource_type(&entry.id) != Some(entry.resource))
            .map(|entry| entry.id)
            .collect();

        if missing.is_empty() {
            Decision::Allow
        } else {
            Decision::Deny { missing }
        }
    }

    /// Like [`admits`](Self::admits), as a `Result`.
    pub fn check_subset(&self, inner: &CapabilitySet) -> Result<()> {
        self.admits(inner).into_result()
    }

    /// Record a transition: `id` is now backed by `resource`.
    ///
    /// Identities are untouched, so offsets stay valid. Returns `false` if
    /// `id` is not in the set.
    pub fn retype(&mut self, id: &CapabilityId, resource: ResourceType) -> bool {
        match self.offset(id) {
            Some(offset) => {
                self.entries[offset].resource = resource;
                true
            }
            None => false,
        }
    }

    /// Whether both sets hold exactly the same identities, whatever their
    /// current resource types.
    pub fn same_identities(&self, other: &CapabilitySet) -> bool {
        self.ids().eq(other.ids())
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<CapabilityId> = self.ids().collect();
        write!(f, "{{{}}}", display_ids(&ids))
    }
}

/// Collects capabilities for a [`CapabilitySet`].
#[derive(Debug, Clone, Default)]
pub struct Builder {
    entries: Vec<Entry>,
}

impl Builder {
    pub fn with<C: Capability>(mut self) -> Self {
        self.entries.push(Entry::of::<C>());
        self
    }

    pub fn labeled<L: Label, C: Capability>(self) -> Self {
        self.with::<Labeled<L, C>>()
    }

    pub fn entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> Result<CapabilitySet> {
        CapabilitySet::from_entries(self.entries)
    }
}
