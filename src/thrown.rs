//! Handler failures and their loggable form.

use std::any::Any;
use std::fmt;

use serde::Serialize;

use crate::error::HandlerError;

/// Message used for panic payloads that are neither `&str` nor `String`.
const OPAQUE_PAYLOAD: &str = "non-error value thrown";

/// A handler failure travelling down the error-hook chain.
pub enum Thrown {
    /// The handler returned `Err`.
    Error(HandlerError),
    /// The handler panicked. The payload is whatever was passed to `panic!`
    /// or `std::panic::panic_any`.
    Panic(Box<dyn Any + Send + 'static>),
}

impl Thrown {
    /// The stack recorded with the failure. Panic payloads carry none.
    pub fn stack(&self) -> Option<&str> {
        match self {
            Self::Error(e) => e.stack(),
            Self::Panic(_) => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Error(e) => e.to_string(),
            Self::Panic(payload) => {
                if let Some(s) = payload.downcast_ref::<&'static str>() {
                    (*s).to_owned()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    OPAQUE_PAYLOAD.to_owned()
                }
            }
        }
    }
}

impl From<HandlerError> for Thrown {
    fn from(e: HandlerError) -> Self {
        Self::Error(e)
    }
}

impl fmt::Debug for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Self::Panic(_) => f.debug_tuple("Panic").field(&self.message()).finish(),
        }
    }
}

/// Logging-only record of a [`Thrown`].
///
/// Building one never changes how the failure propagates; the original
/// [`Thrown`] keeps travelling down the error chain untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrappedError {
    pub message: String,
    pub stack: Option<String>,
}

impl WrappedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), stack: None }
    }

    /// Coerces any thrown value into a record, then copies the original
    /// stack across. The stack is never synthesised here.
    pub fn from_thrown(thrown: &Thrown) -> Self {
        let mut wrapped = Self::new(thrown.message());
        wrapped.stack = thrown.stack().map(str::to_owned);
        wrapped
    }
}

impl fmt::Display for WrappedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
