//! Radix-tree request router and the per-request pipeline.
//!
//! One tree per HTTP method. A request goes through:
//!
//! 1. request hooks, in registration order
//! 2. route lookup (`404` on a miss, no hooks involved)
//! 3. the handler, on its own task so a panic is caught
//! 4. on failure, error hooks in registration order, then `500`

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::error::HandlerError;
use crate::handler::{BoxedHandler, Handler};
use crate::logger::Logger;
use crate::middleware::{ErrorHook, Hooks, RequestHook};
use crate::request::{Request, RequestHead};
use crate::response::Response;
use crate::thrown::Thrown;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    hooks: Hooks,
    logger: Option<Arc<dyn Logger>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), hooks: Hooks::default(), logger: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Appends a success-path hook.
    pub fn hook(mut self, hook: impl RequestHook) -> Self {
        self.hooks.push_request(Arc::new(hook));
        self
    }

    /// Appends an error-path hook.
    pub fn error_hook(mut self, hook: impl ErrorHook) -> Self {
        self.hooks.push_error(Arc::new(hook));
        self
    }

    /// Makes `logger` available to handlers through [`Request::logger`].
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Runs one request through hooks, routing and the handler.
    pub(crate) async fn dispatch(&self, req: Request) -> Response {
        self.run_request_hooks(&req.head);
        self.route(req).await
    }

    /// Request hooks only. The server runs them before reading the body so
    /// a request is seen even when its body never arrives.
    pub(crate) fn run_request_hooks(&self, head: &RequestHead) {
        self.hooks.run_request(head);
    }

    /// Error hooks only; returns what the last hook forwarded.
    pub(crate) fn run_error_hooks(&self, thrown: Thrown, head: &RequestHead) -> Thrown {
        self.hooks.run_error(thrown, head)
    }

    /// Routing and the handler, for a request whose hooks already ran.
    pub(crate) async fn route(&self, mut req: Request) -> Response {
        let head = Arc::clone(&req.head);

        let Some((handler, params)) = self.lookup(head.method(), head.path()) else {
            return Response::status(StatusCode::NOT_FOUND);
        };
        req.params = params;
        req.logger = self.logger.clone();

        let thrown = match tokio::spawn(handler.call(req)).await {
            Ok(Ok(response)) => return response,
            Ok(Err(e)) => Thrown::Error(e),
            Err(e) if e.is_panic() => Thrown::Panic(e.into_panic()),
            Err(_) => Thrown::Error(HandlerError::msg("handler task was cancelled")),
        };

        let unhandled = self.run_error_hooks(thrown, &head);
        debug!(path = head.path(), error = ?unhandled, "handler failed, responding 500");
        Response::status(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
