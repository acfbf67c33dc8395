//! Middleware hooks.
//!
//! Two registration points, mirroring the request lifecycle:
//!
//! - [`RequestHook`]: runs for every request before routing.
//! - [`ErrorHook`]: runs when a handler returns `Err` or panics, receives the
//!   failure and must forward it.
//!
//! Hooks are synchronous. A hook hands control back by consuming its
//! continuation token ([`Next`] / [`ErrorNext`]); the only way to obtain the
//! value a hook must return is to call that token, so every hook passes
//! control on exactly once.
//!
//! ```rust
//! use ssr_log::RequestHead;
//! use ssr_log::middleware::{Next, Proceed, RequestHook};
//!
//! struct Count(std::sync::atomic::AtomicUsize);
//!
//! impl RequestHook for Count {
//!     fn on_request(&self, _req: &RequestHead, next: Next) -> Proceed {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         next.call()
//!     }
//! }
//! ```

pub mod access_log;

pub use access_log::AccessLog;

use std::sync::Arc;

use crate::request::RequestHead;
use crate::thrown::Thrown;

/// Continuation of the request chain.
#[must_use = "a request hook must call `next`"]
pub struct Next {
    _priv: (),
}

impl Next {
    pub(crate) fn new() -> Self {
        Self { _priv: () }
    }

    /// Hands control to the next hook.
    pub fn call(self) -> Proceed {
        Proceed { _priv: () }
    }
}

/// Proof that a [`RequestHook`] called its [`Next`].
pub struct Proceed {
    _priv: (),
}

/// Continuation of the error chain.
#[must_use = "an error hook must forward the error"]
pub struct ErrorNext {
    _priv: (),
}

impl ErrorNext {
    pub(crate) fn new() -> Self {
        Self { _priv: () }
    }

    /// Forwards `err` to the next error hook.
    pub fn call(self, err: Thrown) -> Forwarded {
        Forwarded(err)
    }
}

/// The failure an [`ErrorHook`] forwarded.
pub struct Forwarded(Thrown);

impl Forwarded {
    pub(crate) fn into_inner(self) -> Thrown {
        self.0
    }
}

/// Success-path hook, run before routing.
pub trait RequestHook: Send + Sync + 'static {
    fn on_request(&self, req: &RequestHead, next: Next) -> Proceed;
}

/// Error-path hook, run after a handler failed.
pub trait ErrorHook: Send + Sync + 'static {
    fn on_error(&self, err: Thrown, req: &RequestHead, next: ErrorNext) -> Forwarded;
}

/// Registered hooks, in registration order.
#[derive(Default)]
pub(crate) struct Hooks {
    request: Vec<Arc<dyn RequestHook>>,
    error: Vec<Arc<dyn ErrorHook>>,
}

impl Hooks {
    pub(crate) fn push_request(&mut self, hook: Arc<dyn RequestHook>) {
        self.request.push(hook);
    }

    pub(crate) fn push_error(&mut self, hook: Arc<dyn ErrorHook>) {
        self.error.push(hook);
    }

    pub(crate) fn run_request(&self, req: &RequestHead) {
        for hook in &self.request {
            let _: Proceed = hook.on_request(req, Next::new());
        }
    }

    /// Runs the error chain and returns what the last hook forwarded.
    pub(crate) fn run_error(&self, err: Thrown, req: &RequestHead) -> Thrown {
        self.error
            .iter()
            .fold(err, |err, hook| hook.on_error(err, req, ErrorNext::new()).into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::{HeaderMap, Method, Uri};

    use super::*;
    use crate::error::HandlerError;

    struct Tag(&'static str, Arc<Mutex<Vec<&'static str>>>);

    impl RequestHook for Tag {
        fn on_request(&self, _req: &RequestHead, next: Next) -> Proceed {
            self.1.lock().unwrap().push(self.0);
            next.call()
        }
    }

    impl ErrorHook for Tag {
        fn on_error(&self, err: Thrown, _req: &RequestHead, next: ErrorNext) -> Forwarded {
            self.1.lock().unwrap().push(self.0);
            next.call(err)
        }
    }

    /// Replaces whatever it receives.
    struct Swap;

    impl ErrorHook for Swap {
        fn on_error(&self, _err: Thrown, _req: &RequestHead, next: ErrorNext) -> Forwarded {
            next.call(Thrown::Error(HandlerError::msg("swapped")))
        }
    }

    fn head() -> RequestHead {
        RequestHead::new(Method::GET, Uri::from_static("/"), HeaderMap::new())
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::default();
        hooks.push_request(Arc::new(Tag("a", Arc::clone(&seen))));
        hooks.push_request(Arc::new(Tag("b", Arc::clone(&seen))));
        hooks.push_error(Arc::new(Tag("c", Arc::clone(&seen))));

        hooks.run_request(&head());
        let _ = hooks.run_error(Thrown::Panic(Box::new("x")), &head());

        assert_eq!(*seen.lock().unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn error_chain_passes_along_what_each_hook_forwards() {
        let mut hooks = Hooks::default();
        hooks.push_error(Arc::new(Swap));

        match hooks.run_error(Thrown::Panic(Box::new("x")), &head()) {
            Thrown::Error(e) => assert_eq!(e.to_string(), "swapped"),
            Thrown::Panic(_) => panic!("expected the swapped error"),
        }
    }

    #[test]
    fn empty_chain_returns_the_original() {
        let hooks = Hooks::default();
        let out = hooks.run_error(Thrown::from(HandlerError::msg("kept")), &head());
        assert!(matches!(out, Thrown::Error(e) if e.to_string() == "kept"));
    }
}
