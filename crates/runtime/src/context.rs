//! Execution contexts a program runs in.

use std::future::Future;

/// The ambient context of a driven program.
///
/// Handlers reach the context through [`Cap::invoke_in`](crate::Cap::invoke_in),
/// [`Operation`](crate::Operation) and [`Computation::in_context`](crate::Computation::in_context).
/// When the program finishes the context wraps its result.
pub trait Context: 'static {
    /// Shape of a driver's result in this context.
    type Wrap<T>;

    fn complete<T>(self, value: T) -> Self::Wrap<T>;
}

/// The side-effect-free context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pure;

impl Context for Pure {
    type Wrap<T> = T;

    fn complete<T>(self, value: T) -> T {
        value
    }
}

/// A context that lets handlers emit output lines.
///
/// The lines are returned next to the result.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Context for Transcript {
    type Wrap<T> = (T, Vec<String>);

    fn complete<T>(self, value: T) -> (T, Vec<String>) {
        (value, self.lines)
    }
}

/// A context in which a step may suspend on a future.
///
/// Owns a current-thread tokio runtime; [`block_on`](Self::block_on) parks the
/// running step until the future resolves, so steps still complete strictly
/// one after another. Must not be driven from inside another tokio runtime.
#[derive(Debug)]
pub struct Suspend {
    runtime: tokio::runtime::Runtime,
}

impl Suspend {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    /// Suspend the current step until `future` completes.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn handle(&self) -> &tokio::runtime::Handle {
        self.runtime.handle()
    }
}

impl Context for Suspend {
    type Wrap<T> = T;

    fn complete<T>(self, value: T) -> T {
        value
    }
}
