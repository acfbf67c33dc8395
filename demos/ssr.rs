//! A tiny rendered site with access and error logging.
//!
//! Run with:
//!   SSR_LOG_FILE=false cargo run --example ssr
//!
//! Try:
//!   curl -H 'accept: text/html' http://localhost:3000/posts/hello   # logged
//!   curl -H 'accept: text/html' http://localhost:3000/_nuxt/app.js  # not logged
//!   curl -H 'accept: text/html' http://localhost:3000/broken        # error record
//!   curl -H 'accept: text/html' http://localhost:3000/crash         # panic record

use ssr_log::middleware::AccessLog;
use ssr_log::{
    ContentType, HandlerError, LogConfig, LogOptions, Request, Response, Router, Server, WrappedError,
};

#[tokio::main]
async fn main() -> Result<(), ssr_log::Error> {
    // Server lifecycle messages go to the terminal; access records go where
    // the log config says.
    tracing_subscriber::fmt::init();

    let cfg = LogConfig::resolve(
        LogOptions::from_env()?,
        LogOptions { log_name: Some("demo.log".into()), ..LogOptions::default() },
    );

    let app = AccessLog::from_config(&cfg)?.register(
        Router::new()
            .get("/", home)
            .get("/posts/{slug}", post)
            .get("/_nuxt/app.js", bundle)
            .get("/broken", broken)
            .get("/crash", crash),
    );

    Server::bind("0.0.0.0:3000").serve(app).await
}

async fn home(_req: Request) -> Response {
    Response::html(r#"<h1>Home</h1><script src="/_nuxt/app.js"></script>"#)
}

async fn post(req: Request) -> Result<Response, HandlerError> {
    let slug = req.param("slug").ok_or_else(|| HandlerError::msg("missing slug"))?;
    if slug == "draft" {
        // Handlers can write their own records through the injected logger.
        if let Some(logger) = req.logger() {
            let info = ssr_log::RequestInfo::extract(req.head());
            logger.error(&WrappedError::new("draft requested"), &info);
        }
    }
    Ok(Response::html(format!("<h1>{slug}</h1>")))
}

async fn bundle(_req: Request) -> Response {
    Response::builder().bytes(ContentType::JavaScript, b"console.log('hydrated')".to_vec())
}

async fn broken(_req: Request) -> Result<Response, HandlerError> {
    let raw = std::fs::read_to_string("/definitely/not/here.md")?;
    Ok(Response::html(raw))
}

async fn crash(_req: Request) -> Response {
    panic!("template missing")
}
