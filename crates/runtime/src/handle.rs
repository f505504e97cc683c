//! Handles: the only way a computation reaches a resource.

use crate::computation::Brand;
use crate::{Computation, Context};
use capability::{Capability, CapabilityId};
use std::fmt;
use std::marker::PhantomData;
use tracing::trace;

/// A primitive operation of some capability kind.
///
/// Handlers implement this for each operation they offer; the core only
/// sequences them. Failures belong in `Output` rather than aborting the run.
pub trait Operation<R, Cx> {
    type Output;

    fn apply(self, resource: &mut R, cx: &mut Cx) -> Self::Output;
}

/// Handle to a capability whose resource keeps one type for the whole run.
///
/// Minted by [`Scope::cap`](crate::Scope::cap); resolved to a fixed slot
/// offset at that point, so operations never look identities up by name.
pub struct Cap<'s, C> {
    offset: usize,
    _brand: Brand<'s>,
    _kind: PhantomData<fn() -> C>,
}

impl<C> Clone for Cap<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Cap<'_, C> {}

impl<'s, C: Capability> Cap<'s, C> {
    pub(crate) fn new(offset: usize) -> Self {
        Self {
            offset,
            _brand: PhantomData,
            _kind: PhantomData,
        }
    }

    pub fn id(&self) -> CapabilityId {
        C::id()
    }

    /// Read the current value.
    pub fn get<Cx: Context>(self) -> Computation<'s, C::Resource, Cx>
    where
        C::Resource: Clone,
    {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "get");
            frame.resource::<C::Resource>(self.offset).clone()
        })
    }

    /// Replace the current value.
    pub fn put<Cx: Context>(self, value: C::Resource) -> Computation<'s, (), Cx> {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "put");
            *frame.resource::<C::Resource>(self.offset) = value;
        })
    }

    /// Replace the current value with `f` of it.
    pub fn update<Cx, F>(self, f: F) -> Computation<'s, (), Cx>
    where
        Cx: Context,
        F: FnOnce(C::Resource) -> C::Resource + 's,
    {
        self.invoke(move |resource| ((), f(resource)))
    }

    /// Mutate the value in place, returning whatever `f` returns.
    pub fn modify<T, Cx, F>(self, f: F) -> Computation<'s, T, Cx>
    where
        T: 's,
        Cx: Context,
        F: FnOnce(&mut C::Resource) -> T + 's,
    {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "modify");
            f(frame.resource::<C::Resource>(self.offset))
        })
    }

    /// Apply `op` to the value, producing a result and the next value.
    pub fn invoke<T, Cx, F>(self, op: F) -> Computation<'s, T, Cx>
    where
        T: 's,
        Cx: Context,
        F: FnOnce(C::Resource) -> (T, C::Resource) + 's,
    {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "invoke");
            frame.replace(self.offset, op)
        })
    }

    /// Like [`modify`](Self::modify), with access to the execution context.
    pub fn invoke_in<T, Cx, F>(self, op: F) -> Computation<'s, T, Cx>
    where
        T: 's,
        Cx: Context,
        F: FnOnce(&mut C::Resource, &mut Cx) -> T + 's,
    {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "invoke in context");
            let (resource, cx) = frame.resource_in::<C::Resource>(self.offset);
            op(resource, cx)
        })
    }

    /// Run a handler-defined [`Operation`].
    pub fn perform<O, Cx>(self, op: O) -> Computation<'s, O::Output, Cx>
    where
        Cx: Context,
        O: Operation<C::Resource, Cx> + 's,
        O::Output: 's,
    {
        self.invoke_in(move |resource, cx| op.apply(resource, cx))
    }
}

impl<C: Capability> fmt::Debug for Cap<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cap")
            .field("id", &C::id())
            .field("offset", &self.offset)
            .finish()
    }
}

/// Which of two resource states a transition landed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch<A, B> {
    Left(A),
    Right(B),
}

/// The successor handle of a two-way transition.
///
/// Matching on it is how a continuation learns which resource type the
/// capability now has.
pub enum Branched<'s, C, A, B> {
    Left(Linear<'s, C, A>),
    Right(Linear<'s, C, B>),
}

impl<C: Capability, A: 'static, B: 'static> fmt::Debug for Branched<'_, C, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branched::Left(handle) => f.debug_tuple("Left").field(handle).finish(),
            Branched::Right(handle) => f.debug_tuple("Right").field(handle).finish(),
        }
    }
}

/// Handle to a lifecycle capability whose resource is currently an `R`.
///
/// Not `Copy`: every operation consumes the handle and hands back its
/// successor inside the result, typed by the resource the slot holds next.
/// A stale handle for an old resource type therefore cannot be used.
pub struct Linear<'s, C, R> {
    offset: usize,
    _brand: Brand<'s>,
    _state: PhantomData<fn() -> (C, R)>,
}

impl<'s, C: Capability, R: 'static> Linear<'s, C, R> {
    pub(crate) fn new(offset: usize) -> Self {
        Self {
            offset,
            _brand: PhantomData,
            _state: PhantomData,
        }
    }

    fn retype<S: 'static>(self) -> Linear<'s, C, S> {
        Linear::new(self.offset)
    }

    pub fn id(&self) -> CapabilityId {
        C::id()
    }

    /// Read the current value.
    pub fn get<Cx: Context>(self) -> Computation<'s, (R, Self), Cx>
    where
        R: Clone,
    {
        self.read(R::clone)
    }

    /// Inspect the current value.
    pub fn read<T, Cx, F>(self, f: F) -> Computation<'s, (T, Self), Cx>
    where
        T: 's,
        Cx: Context,
        F: FnOnce(&R) -> T + 's,
    {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "read");
            let value = f(frame.resource::<R>(self.offset));
            (value, self)
        })
    }

    /// Replace the value, possibly with one of another type.
    pub fn put<S: 'static, Cx: Context>(self, value: S) -> Computation<'s, Linear<'s, C, S>, Cx> {
        self.invoke(move |_| ((), value)).map(|((), next)| next)
    }

    /// Apply `op` to the value, producing a result and the next value.
    pub fn invoke<T, S, Cx, F>(self, op: F) -> Computation<'s, (T, Linear<'s, C, S>), Cx>
    where
        T: 's,
        S: 'static,
        Cx: Context,
        F: FnOnce(R) -> (T, S) + 's,
    {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "invoke");
            let value = frame.replace(self.offset, op);
            (value, self.retype())
        })
    }

    /// Apply `op`, whose result decides which of two resource types the
    /// capability holds next.
    pub fn transition<T, A, B, Cx, F>(
        self,
        op: F,
    ) -> Computation<'s, (T, Branched<'s, C, A, B>), Cx>
    where
        T: 's,
        A: 'static,
        B: 'static,
        Cx: Context,
        F: FnOnce(R) -> (T, Branch<A, B>) + 's,
    {
        Computation::from_step(move |frame| {
            trace!(capability = %C::id(), "transition");
            let slot = frame.slot(self.offset);
            let id = slot.id();
            let Some(current) = slot.take::<R>() else {
                panic!("{id} does not hold a {}", std::any::type_name::<R>());
            };
            let (value, next) = op(current);
            let handle = match next {
                Branch::Left(resource) => {
                    slot.store(resource);
                    Branched::Left(self.retype())
                }
                Branch::Right(resource) => {
                    slot.store(resource);
                    Branched::Right(self.retype())
                }
            };
            (value, handle)
        })
    }
}

impl<C: Capability, R: 'static> fmt::Debug for Linear<'_, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Linear")
            .field("id", &C::id())
            .field("resource", &std::any::type_name::<R>())
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CapabilitySet, Program, Pure, Resource, ResourceEnvironment, ResourceType, Transcript,
        run_in, run_pure, run_pure_env,
    };

    crate::capability!(Stack: Vec<u32>);
    crate::capability!(Names: Vec<String>);
    crate::capability!(Door: Closed);

    #[derive(Debug, Clone, PartialEq)]
    struct Closed {
        key: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Open {
        key: u32,
        visits: u32,
    }

    /// Bounds-checked lookup; out of range is a `None` result, not a fault.
    struct Lookup(usize);

    impl<Cx> Operation<Vec<String>, Cx> for Lookup {
        type Output = Option<String>;

        fn apply(self, names: &mut Vec<String>, _cx: &mut Cx) -> Option<String> {
            names.get(self.0).cloned()
        }
    }

    /// Appends to the resource and echoes to the transcript.
    struct Announce(&'static str);

    impl Operation<Vec<String>, Transcript> for Announce {
        type Output = usize;

        fn apply(self, names: &mut Vec<String>, cx: &mut Transcript) -> usize {
            names.push(self.0.to_string());
            cx.emit(format!("added {}", self.0));
            names.len()
        }
    }

    fn single<C: Capability>(value: C::Resource) -> (CapabilitySet, ResourceEnvironment) {
        let set = CapabilitySet::builder().with::<C>().build().unwrap();
        let env = ResourceEnvironment::explicit(&set, [Resource::new::<C>(value)]).unwrap();
        (set, env)
    }

    #[test]
    fn test_invoke_produces_result_and_next_value() {
        let (set, env) = single::<Stack>(vec![1, 2, 3]);
        let program = Program::new(set, |scope| {
            let stack = scope.cap::<Stack>()?;
            let pop = move || {
                stack.invoke(|mut items: Vec<u32>| {
                    let top = items.pop();
                    (top, items)
                })
            };
            Ok(pop().zip(pop()).zip(stack.get()))
        })
        .unwrap();

        let ((first, second), rest) = run_pure(program, env).unwrap();
        assert_eq!((first, second), (Some(3), Some(2)));
        assert_eq!(rest, vec![1]);
    }

    #[test]
    fn test_perform_keeps_handler_failure_in_result() {
        let (set, env) = single::<Names>(vec!["Jim".into(), "Alice".into()]);
        let program = Program::new(set, |scope| {
            let names = scope.cap::<Names>()?;
            Ok(names.perform(Lookup(1)).zip(names.perform(Lookup(9))))
        })
        .unwrap();

        let (hit, miss): (Option<String>, Option<String>) = run_pure(program, env).unwrap();
        assert_eq!(hit.as_deref(), Some("Alice"));
        assert_eq!(miss, None);
    }

    #[test]
    fn test_perform_in_context() {
        let (set, env) = single::<Names>(Vec::new());
        let program = Program::new(set, |scope| {
            let names = scope.cap::<Names>()?;
            Ok(names.perform(Announce("Bob")).then(names.perform(Announce("Fred"))))
        })
        .unwrap();

        let (count, lines) = run_in(program, env, Transcript::new()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(lines, vec!["added Bob", "added Fred"]);
    }

    #[test]
    fn test_linear_put_changes_resource_type() {
        let (set, env) = single::<Door>(Closed { key: 7 });
        let program = Program::new(set, |scope| {
            let door = scope.linear::<Door>()?;
            Ok(door
                .put(Open { key: 7, visits: 0 })
                .and_then(|door| door.invoke(|open: Open| (open.key, Open { visits: 1, ..open })))
                .and_then(|(key, door)| door.get().map(move |(open, _)| (key, open))))
        })
        .unwrap();

        let outcome = run_pure_env(program, env).unwrap();
        assert_eq!(outcome.value, (7, Open { key: 7, visits: 1 }));
        assert_eq!(
            outcome.output_set().resource_type(&Door::id()),
            Some(ResourceType::of::<Open>())
        );
    }

    fn try_open<'s>(
        door: Linear<'s, Door, Closed>,
        key: u32,
    ) -> Computation<'s, (bool, Branched<'s, Door, Open, Closed>), Pure> {
        door.transition(move |closed: Closed| {
            if closed.key == key {
                (true, Branch::Left(Open { key, visits: 0 }))
            } else {
                (false, Branch::Right(closed))
            }
        })
    }

    #[test]
    fn test_transition_depends_on_result() {
        for (key, opened) in [(7, true), (8, false)] {
            let (set, env) = single::<Door>(Closed { key: 7 });
            let program = Program::new(set, |scope| {
                let door = scope.linear::<Door>()?;
                Ok(try_open(door, key).and_then(|(ok, next)| match next {
                    Branched::Left(open) => open
                        .invoke(|open: Open| ((), Open { visits: open.visits + 1, ..open }))
                        .map(move |_| ok),
                    Branched::Right(closed) => closed.read(|c: &Closed| c.key).map(move |_| ok),
                }))
            })
            .unwrap();

            let outcome = run_pure_env(program, env).unwrap();
            assert_eq!(outcome.value, opened);

            let expected = if opened {
                ResourceType::of::<Open>()
            } else {
                ResourceType::of::<Closed>()
            };
            assert_eq!(outcome.output_set().resource_type(&Door::id()), Some(expected));
            if opened {
                assert_eq!(
                    outcome.env.get_as::<Door, Open>(),
                    Some(&Open { key: 7, visits: 1 })
                );
            }
        }
    }
}
