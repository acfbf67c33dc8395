//! Unified error types.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Boxed error accepted by [`HandlerError::new`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by ssr-log's fallible setup operations.
///
/// Request-level failures never surface here: handlers fail with
/// [`HandlerError`], and the logging hooks swallow their own failures. This
/// type covers infrastructure only: binding a port, creating the log
/// directory, reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// An error returned by a route handler.
///
/// Wraps any `std::error::Error` together with the stack it was raised
/// with. The stack is captured through [`Backtrace::capture`], so it is only
/// present when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables it, unless
/// one is attached explicitly with [`with_stack`](HandlerError::with_stack).
///
/// Any error converts with `?`:
///
/// ```rust,no_run
/// use ssr_log::{HandlerError, Request, Response};
///
/// async fn page(req: Request) -> Result<Response, HandlerError> {
///     let n: u32 = std::str::from_utf8(req.body())?.trim().parse()?;
///     Ok(Response::text(format!("{}", n * 2)))
/// }
/// ```
pub struct HandlerError {
    inner: BoxError,
    stack: Option<String>,
}

impl HandlerError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        let backtrace = Backtrace::capture();
        let stack = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };
        Self { inner: err.into(), stack }
    }

    /// An error carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }

    /// Replaces the recorded stack.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.inner
    }

    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: E) -> Self {
        Self::new(e)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("inner", &self.inner)
            .field("stack", &self.stack)
            .finish()
    }
}
