//! Construction-time view of one capability set.

use crate::computation::Brand;
use crate::{Cap, Computation, Context, Error, Linear, Program, Pure, Result};
use capability::{Capability, CapabilityId, CapabilitySet, Label, Labeled, ResourceType};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Shared,
    Linear,
}

/// The capabilities available while a [`Program`] is being built.
///
/// Every handle comes from a scope, and asking for a capability the scope
/// does not hold fails right there, before anything can run. The `'s` brand
/// keeps handles and computations from leaking into another scope.
pub struct Scope<'s> {
    set: CapabilitySet,
    usage: RefCell<BTreeMap<CapabilityId, Usage>>,
    _brand: Brand<'s>,
}

impl<'s> Scope<'s> {
    pub(crate) fn new(set: CapabilitySet) -> Self {
        Self {
            set,
            usage: RefCell::new(BTreeMap::new()),
            _brand: PhantomData,
        }
    }

    /// The capability set this scope was opened for.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.set
    }

    /// Shared handle to `C`.
    pub fn cap<C: Capability>(&self) -> Result<Cap<'s, C>> {
        let offset = self.offset_of::<C>()?;
        self.claim(C::id(), Usage::Shared)?;
        Ok(Cap::new(offset))
    }

    /// Shared handle to `C` under label `L`.
    pub fn labeled<L: Label, C: Capability>(&self) -> Result<Cap<'s, Labeled<L, C>>> {
        self.cap::<Labeled<L, C>>()
    }

    /// The one linear handle to `C`.
    ///
    /// Fails if `C` already has a linear or shared handle in this scope.
    pub fn linear<C: Capability>(&self) -> Result<Linear<'s, C, C::Resource>> {
        let offset = self.offset_of::<C>()?;
        self.claim(C::id(), Usage::Linear)?;
        Ok(Linear::new(offset))
    }

    /// Invoke `program` from this scope.
    ///
    /// Its capability set must be a subset of this scope's. The inner
    /// offsets are translated to this scope's layout once, here.
    pub fn embed<T, Cx>(&self, program: Program<T, Cx>) -> Result<Computation<'s, T, Cx>>
    where
        T: 'static,
        Cx: Context,
    {
        let remap = self.remap(&program)?;
        let body = program.into_body();
        Ok(Computation::from_step(move |frame| {
            let positions: Vec<usize> = remap.iter().map(|&offset| frame.locate(offset)).collect();
            let mut inner = frame.nested(&positions);
            body(&mut inner)
        }))
    }

    /// Invoke a side-effect-free `program` from a scope of any context.
    ///
    /// Same checks as [`embed`](Self::embed). The inner program never
    /// sees the caller's context.
    pub fn embed_pure<T, Cx>(&self, program: Program<T, Pure>) -> Result<Computation<'s, T, Cx>>
    where
        T: 'static,
        Cx: Context,
    {
        let remap = self.remap(&program)?;
        let body = program.into_body();
        Ok(Computation::from_step(move |frame| {
            let positions: Vec<usize> = remap.iter().map(|&offset| frame.locate(offset)).collect();
            let mut pure = Pure;
            let mut inner = frame.nested_in(&positions, &mut pure);
            body(&mut inner)
        }))
    }

    /// Composition check: inner offset to scope offset, for every identity
    /// `program` requires. Claims shared use of all of them.
    fn remap<T, Cx>(&self, program: &Program<T, Cx>) -> Result<Vec<usize>>
    where
        T: 'static,
        Cx: Context,
    {
        if let Some(id) = program.linear().first() {
            return Err(Error::LinearNotEmbeddable(*id));
        }
        if let Err(e) = self.set.check_subset(program.input()) {
            warn!(inner = %program.input(), outer = %self.set, "composition rejected");
            return Err(e.into());
        }

        let remap = program
            .input()
            .ids()
            .map(|id| self.set.offset(&id).ok_or(Error::Unavailable(id)))
            .collect::<Result<Vec<usize>>>()?;
        for id in program.input().ids() {
            self.claim(id, Usage::Shared)?;
        }
        debug!(inner = %program.input(), outer = %self.set, "program embedded");
        Ok(remap)
    }

    /// Identities held linearly, consuming the scope.
    pub(crate) fn into_linear(self) -> Vec<CapabilityId> {
        self.usage
            .into_inner()
            .into_iter()
            .filter(|(_, usage)| *usage == Usage::Linear)
            .map(|(id, _)| id)
            .collect()
    }

    fn offset_of<C: Capability>(&self) -> Result<usize> {
        let id = C::id();
        let resource = Some(ResourceType::of::<C::Resource>());
        match self.set.offset(&id) {
            Some(offset) if self.set.resource_type(&id) == resource => Ok(offset),
            _ => {
                warn!(capability = %id, capabilities = %self.set, "capability not available");
                Err(Error::Unavailable(id))
            }
        }
    }

    fn claim(&self, id: CapabilityId, usage: Usage) -> Result<()> {
        let mut claims = self.usage.borrow_mut();
        match (claims.get(&id), usage) {
            (None, _) => {
                claims.insert(id, usage);
                Ok(())
            }
            (Some(Usage::Shared), Usage::Shared) => Ok(()),
            _ => Err(Error::LinearConflict(id)),
        }
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("capabilities", &self.set)
            .finish_non_exhaustive()
    }
}
