//! The logging handle the hooks write through.
//!
//! [`Logger`] is the seam: the access-log hooks hold an `Arc<dyn Logger>`
//! handed to them at construction time, never a process-wide global.
//! [`TracingLogger`] is the implementation shipped with the crate. It owns a
//! private `tracing` dispatcher that writes one JSON object per record:
//!
//! ```text
//! {"timestamp":"…","level":"INFO","message":"Accessed /about","url":"/about","method":"GET","headers":"{\"accept\":\"text/html\"}","target":"ssr_log::access"}
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing::field::display;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::LogConfig;
use crate::error::Error;
use crate::info::RequestInfo;
use crate::thrown::WrappedError;

/// Destination of access and error records.
///
/// Calls are fire-and-forget. Implementations must not block for long: they
/// run inline on the request path.
pub trait Logger: Send + Sync + 'static {
    /// Records a successful request.
    fn info(&self, message: &str, info: &RequestInfo);

    /// Records a handler failure.
    fn error(&self, error: &WrappedError, info: &RequestInfo);
}

/// [`Logger`] backed by `tracing`.
///
/// `tracing` fields are flat, so the request headers are written as one
/// string field holding their JSON encoding, not as a nested object.
/// Consumers decode `headers` a second time.
#[derive(Clone)]
pub struct TracingLogger {
    dispatch: Option<Dispatch>,
}

impl TracingLogger {
    /// Builds a logger writing JSON lines to the file or stream `cfg` names.
    ///
    /// With file logging on, the log directory is created if it does not
    /// exist and records are appended to `<log_path>/<log_name>`. Otherwise
    /// records go to stdout.
    pub fn from_config(cfg: &LogConfig) -> Result<Self, Error> {
        let writer = if cfg.use_file_logging {
            BoxMakeWriter::new(Mutex::new(open_log_file(&cfg.log_path, &cfg.log_name)?))
        } else {
            BoxMakeWriter::new(std::io::stdout)
        };
        Self::with_writer(&cfg.level, writer)
    }

    /// Builds a JSON logger over any `MakeWriter`, filtered by the
    /// `EnvFilter` directive `level`.
    pub fn with_writer<W>(level: &str, writer: W) -> Result<Self, Error>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_env_filter(EnvFilter::try_new(level)?)
            .with_writer(writer)
            .finish();

        Ok(Self { dispatch: Some(Dispatch::new(subscriber)) })
    }

    /// A logger that emits into whatever subscriber is current at the call
    /// site, for hosts that already configure `tracing` themselves.
    pub fn ambient() -> Self {
        Self { dispatch: None }
    }

    fn emit(&self, f: impl FnOnce()) {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str, info: &RequestInfo) {
        let headers = headers_json(info);
        self.emit(|| {
            tracing::info!(
                target: "ssr_log::access",
                url = %info.url,
                method = %info.method,
                headers = %headers,
                remote_addr = info.remote_addr.map(display),
                "{message}"
            );
        });
    }

    fn error(&self, error: &WrappedError, info: &RequestInfo) {
        let headers = headers_json(info);
        self.emit(|| {
            tracing::error!(
                target: "ssr_log::error",
                error = %error.message,
                stack = error.stack.as_deref(),
                url = %info.url,
                method = %info.method,
                headers = %headers,
                remote_addr = info.remote_addr.map(display),
                "{}",
                error.message
            );
        });
    }
}

fn headers_json(info: &RequestInfo) -> String {
    serde_json::to_string(&info.headers).unwrap_or_default()
}

/// Creates `dir` if needed and opens `dir/name` for appending.
fn open_log_file(dir: &Path, name: &str) -> Result<File, Error> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new().create(true).append(true).open(dir.join(name))?;
    Ok(file)
}
