//! Programs: computations bundled with the capability set they require.

use crate::computation::Frame;
use crate::{Computation, Context, Pure, Result, Scope};
use capability::{CapabilityId, CapabilitySet};
use std::fmt;
use tracing::debug;

type Body<T, Cx> = Box<dyn FnOnce(&mut Frame<'_, Cx>) -> T>;

/// A function whose type carries its required capability set.
///
/// Built with [`Program::new`], then either driven against an environment
/// matching [`input`](Self::input) or invoked from a larger scope with
/// [`Scope::embed`].
pub struct Program<T, Cx = Pure> {
    input: CapabilitySet,
    linear: Vec<CapabilityId>,
    body: Body<T, Cx>,
}

impl<T: 'static, Cx: Context> Program<T, Cx> {
    /// Open a [`Scope`] over `set` and build the program's computation in it.
    ///
    /// Any handle request `build` makes for a capability outside `set`
    /// fails here, so an unavailable capability never surfaces mid-run.
    ///
    /// ```
    /// use runtime::{CapabilitySet, Computation, Program};
    ///
    /// runtime::capability!(Counter: u64);
    ///
    /// let set = CapabilitySet::builder().with::<Counter>().build()?;
    /// let program: Program<u64> = Program::new(set, |scope| {
    ///     let counter = scope.cap::<Counter>()?;
    ///     Ok(counter.update(|n| n + 1).then(counter.get()))
    /// })?;
    /// assert_eq!(program.input().len(), 1);
    /// # Ok::<(), runtime::Error>(())
    /// ```
    pub fn new<F>(set: CapabilitySet, build: F) -> Result<Self>
    where
        F: for<'s> FnOnce(&Scope<'s>) -> Result<Computation<'s, T, Cx>>,
    {
        let scope = Scope::new(set.clone());
        let computation = build(&scope)?;
        let linear = scope.into_linear();
        debug!(capabilities = %set, linear = linear.len(), "program built");

        Ok(Self {
            input: set,
            linear,
            body: computation.into_step(),
        })
    }

    /// The capability set an environment must match exactly to drive this.
    pub fn input(&self) -> &CapabilitySet {
        &self.input
    }

    /// Identities this program holds through linear handles.
    pub fn linear(&self) -> &[CapabilityId] {
        &self.linear
    }

    pub(crate) fn into_body(self) -> Body<T, Cx> {
        self.body
    }
}

impl<T, Cx> fmt::Debug for Program<T, Cx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("input", &self.input)
            .field("linear", &self.linear)
            .finish_non_exhaustive()
    }
}
