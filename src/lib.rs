//! # ssr-log
//!
//! Request and error logging for server-side rendered sites, on a minimal
//! HTTP host.
//!
//! Every page load and API call gets one structured info record; every
//! handler failure gets one error record that keeps the stack it was raised
//! with. Static build artefacts and asset fetches are left out, so the log
//! reads like a list of what users actually did.
//!
//! - [`middleware::AccessLog`]: the request hook and the error hook
//! - [`is_loggable`]: which requests get an access record
//! - [`WrappedError`]: the loggable form of whatever a handler threw
//! - [`Logger`] / [`TracingLogger`]: the injected log handle, JSON lines via
//!   `tracing`
//! - [`LogConfig`]: defaults → host settings → call-site overrides
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ssr_log::middleware::AccessLog;
//! use ssr_log::{HandlerError, LogConfig, LogOptions, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ssr_log::Error> {
//!     let cfg = LogConfig::resolve(LogOptions::from_env()?, LogOptions::default());
//!
//!     let app = AccessLog::from_config(&cfg)?.register(
//!         Router::new()
//!             .get("/", home)
//!             .get("/posts/{slug}", post),
//!     );
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn home(_req: Request) -> Response {
//!     Response::html("<h1>Home</h1>")
//! }
//!
//! async fn post(req: Request) -> Result<Response, HandlerError> {
//!     let slug = req.param("slug").ok_or_else(|| HandlerError::msg("missing slug"))?;
//!     Ok(Response::html(format!("<h1>{slug}</h1>")))
//! }
//! ```

mod classify;
mod config;
mod error;
mod handler;
mod info;
mod logger;
mod request;
mod response;
mod router;
mod server;
mod thrown;

pub mod middleware;

pub use classify::{ClassifyOptions, DEFAULT_ASSET_MARKER, is_loggable};
pub use config::{LogConfig, LogOptions};
pub use error::{BoxError, Error, HandlerError};
pub use handler::{Handler, IntoOutcome};
pub use info::{HeaderField, RequestInfo};
pub use logger::{Logger, TracingLogger};
pub use request::{Request, RequestHead};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use thrown::{Thrown, WrappedError};
