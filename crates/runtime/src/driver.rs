//! Drivers: run a program against an environment in an execution context.

use crate::computation::Frame;
use crate::{Context, Error, Program, Pure, Result};
use environment::{Defaults, ResourceEnvironment};
use tracing::{debug, warn};

/// A program's result together with the environment it left behind.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub env: ResourceEnvironment,
}

impl<T> Outcome<T> {
    /// The capability set after the run, with any transitioned resource types.
    pub fn output_set(&self) -> capability::CapabilitySet {
        self.env.capabilities()
    }
}

/// Run a side-effect-free program, discarding the final environment.
pub fn run_pure<T: 'static>(program: Program<T, Pure>, env: ResourceEnvironment) -> Result<T> {
    run_pure_env(program, env).map(|outcome| outcome.value)
}

/// Run a side-effect-free program and keep the final environment.
pub fn run_pure_env<T: 'static>(
    program: Program<T, Pure>,
    env: ResourceEnvironment,
) -> Result<Outcome<T>> {
    let (value, env) = drive(program, env, &mut Pure)?;
    Ok(Outcome { value, env })
}

/// Run a side-effect-free program in an environment built from `defaults`.
pub fn run_default<T: 'static>(program: Program<T, Pure>, defaults: &Defaults) -> Result<T> {
    let env = ResourceEnvironment::from_defaults(program.input(), defaults)?;
    run_pure(program, env)
}

/// Run a program in `cx`, returning its result wrapped by the context.
pub fn run_in<T, Cx>(
    program: Program<T, Cx>,
    env: ResourceEnvironment,
    mut cx: Cx,
) -> Result<Cx::Wrap<T>>
where
    T: 'static,
    Cx: Context,
{
    let (value, _) = drive(program, env, &mut cx)?;
    Ok(cx.complete(value))
}

/// Run a program in `cx` and keep the final environment.
pub fn run_in_env<T, Cx>(
    program: Program<T, Cx>,
    env: ResourceEnvironment,
    mut cx: Cx,
) -> Result<Cx::Wrap<Outcome<T>>>
where
    T: 'static,
    Cx: Context,
{
    let (value, env) = drive(program, env, &mut cx)?;
    Ok(cx.complete(Outcome { value, env }))
}

fn drive<T, Cx>(
    program: Program<T, Cx>,
    mut env: ResourceEnvironment,
    cx: &mut Cx,
) -> Result<(T, ResourceEnvironment)>
where
    T: 'static,
    Cx: Context,
{
    let found = env.capabilities();
    if &found != program.input() {
        warn!(expected = %program.input(), found = %found, "environment mismatch");
        return Err(Error::EnvironmentMismatch {
            expected: program.input().clone(),
            found,
        });
    }

    debug!(capabilities = %found, "driving program");
    let body = program.into_body();
    let value = {
        let mut frame = Frame::new(env.slots_mut(), cx);
        body(&mut frame)
    };
    debug!(output = %env.capabilities(), "program finished");

    Ok((value, env))
}
