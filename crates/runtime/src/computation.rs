//! Staged computations and the frame they run against.

use crate::{Context, Pure};
use environment::Slot;
use std::any::type_name;
use std::marker::PhantomData;

/// Invariant lifetime tying handles and computations to one scope.
pub(crate) type Brand<'s> = PhantomData<fn(&'s ()) -> &'s ()>;

/// Exclusive view of an environment's slots for the step currently running.
///
/// Offsets are those of the scope a computation was built in; `remap`
/// translates them when the computation was embedded into a larger scope.
pub(crate) struct Frame<'f, Cx> {
    slots: &'f mut [Slot],
    remap: Option<&'f [usize]>,
    cx: &'f mut Cx,
}

impl<'f, Cx> Frame<'f, Cx> {
    pub(crate) fn new(slots: &'f mut [Slot], cx: &'f mut Cx) -> Self {
        Self {
            slots,
            remap: None,
            cx,
        }
    }

    /// Position in the environment of a scope-local offset.
    pub(crate) fn locate(&self, offset: usize) -> usize {
        match self.remap {
            Some(map) => map[offset],
            None => offset,
        }
    }

    /// Reborrow this frame for an embedded computation.
    ///
    /// `remap` must already be expressed in environment positions.
    pub(crate) fn nested<'g>(&'g mut self, remap: &'g [usize]) -> Frame<'g, Cx> {
        Frame {
            slots: &mut *self.slots,
            remap: Some(remap),
            cx: &mut *self.cx,
        }
    }

    /// Like [`nested`](Self::nested), running against another context.
    pub(crate) fn nested_in<'g, Dx>(
        &'g mut self,
        remap: &'g [usize],
        cx: &'g mut Dx,
    ) -> Frame<'g, Dx> {
        Frame {
            slots: &mut *self.slots,
            remap: Some(remap),
            cx,
        }
    }

    pub(crate) fn slot(&mut self, offset: usize) -> &mut Slot {
        let position = self.locate(offset);
        &mut self.slots[position]
    }

    pub(crate) fn context(&mut self) -> &mut Cx {
        &mut *self.cx
    }

    /// Typed access to the resource at `offset`.
    ///
    /// # Panics
    ///
    /// If the slot does not hold an `R`. Handles are branded to their scope
    /// and linear handles track retyping, so this only fires on a broken
    /// scope invariant.
    pub(crate) fn resource<R: 'static>(&mut self, offset: usize) -> &mut R {
        let slot = self.slot(offset);
        let id = slot.id();
        match slot.get_mut::<R>() {
            Some(resource) => resource,
            None => panic!("{id} does not hold a {}", type_name::<R>()),
        }
    }

    /// Resource and context together, for context-aware handlers.
    pub(crate) fn resource_in<R: 'static>(&mut self, offset: usize) -> (&mut R, &mut Cx) {
        let position = self.locate(offset);
        let slot = &mut self.slots[position];
        let id = slot.id();
        match slot.get_mut::<R>() {
            Some(resource) => (resource, &mut *self.cx),
            None => panic!("{id} does not hold a {}", type_name::<R>()),
        }
    }

    /// Move the resource at `offset` through `op`, storing what it returns.
    ///
    /// The stored value may have a different type, which is how lifecycle
    /// capabilities change state.
    pub(crate) fn replace<R, S, T>(&mut self, offset: usize, op: impl FnOnce(R) -> (T, S)) -> T
    where
        R: 'static,
        S: 'static,
    {
        let slot = self.slot(offset);
        let id = slot.id();
        let Some(current) = slot.take::<R>() else {
            panic!("{id} does not hold a {}", type_name::<R>());
        };
        let (value, next) = op(current);
        slot.store(next);
        value
    }
}

pub(crate) type Step<'s, T, Cx> = Box<dyn FnOnce(&mut Frame<'_, Cx>) -> T + 's>;

/// A not-yet-run effectful procedure producing a `T`.
///
/// Built from handle operations and [`pure`](Self::pure), chained with
/// [`and_then`](Self::and_then), and consumed exactly once when its
/// [`Program`](crate::Program) is driven. Steps run strictly left to right:
/// a step always observes every mutation made by the steps before it.
///
/// `'s` brands the computation to the [`Scope`](crate::Scope) its handles
/// came from, so computations of different scopes cannot be sequenced.
pub struct Computation<'s, T, Cx = Pure> {
    step: Step<'s, T, Cx>,
    _brand: Brand<'s>,
}

impl<'s, T: 's, Cx: Context> Computation<'s, T, Cx> {
    pub(crate) fn from_step(step: impl FnOnce(&mut Frame<'_, Cx>) -> T + 's) -> Self {
        Self {
            step: Box::new(step),
            _brand: PhantomData,
        }
    }

    pub(crate) fn into_step(self) -> Step<'s, T, Cx> {
        self.step
    }

    /// A computation that returns `value` without touching the environment.
    pub fn pure(value: T) -> Self {
        Self::from_step(move |_| value)
    }

    /// Run an action in the execution context. Does not touch the environment.
    pub fn in_context(action: impl FnOnce(&mut Cx) -> T + 's) -> Self {
        Self::from_step(move |frame| action(frame.context()))
    }

    /// Run `self`, then the computation `next` builds from its result.
    pub fn and_then<U, F>(self, next: F) -> Computation<'s, U, Cx>
    where
        U: 's,
        F: FnOnce(T) -> Computation<'s, U, Cx> + 's,
    {
        let first = self.step;
        Computation::from_step(move |frame| {
            let value = first(&mut *frame);
            (next(value).step)(frame)
        })
    }

    /// Run `self`, discard its result, then run `next`.
    pub fn then<U: 's>(self, next: Computation<'s, U, Cx>) -> Computation<'s, U, Cx> {
        self.and_then(move |_| next)
    }

    pub fn map<U, F>(self, f: F) -> Computation<'s, U, Cx>
    where
        U: 's,
        F: FnOnce(T) -> U + 's,
    {
        let step = self.step;
        Computation::from_step(move |frame| f(step(frame)))
    }

    /// Run `self` then `other`, returning both results.
    pub fn zip<U: 's>(self, other: Computation<'s, U, Cx>) -> Computation<'s, (T, U), Cx> {
        let first = self.step;
        let second = other.step;
        Computation::from_step(move |frame| {
            let left = first(&mut *frame);
            let right = second(&mut *frame);
            (left, right)
        })
    }

    /// Run every computation in order, collecting the results.
    pub fn sequence_all(
        computations: impl IntoIterator<Item = Self>,
    ) -> Computation<'s, Vec<T>, Cx> {
        let steps: Vec<Step<'s, T, Cx>> = computations.into_iter().map(|c| c.step).collect();
        Computation::from_step(move |frame| {
            steps.into_iter().map(|step| step(&mut *frame)).collect()
        })
    }
}

impl<T, Cx> std::fmt::Debug for Computation<'_, T, Cx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computation")
            .field("output", &type_name::<T>())
            .finish_non_exhaustive()
    }
}
