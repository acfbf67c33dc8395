//! Access and error logging hooks.
//!
//! [`AccessLog`] writes one info record per loggable request and one error
//! record per handler failure. Logging is best effort: nothing it does can
//! change the response or the error the rest of the chain sees.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use super::{ErrorHook, ErrorNext, Forwarded, Next, Proceed, RequestHook};
use crate::classify::{self, ClassifyOptions};
use crate::config::LogConfig;
use crate::error::Error;
use crate::info::RequestInfo;
use crate::logger::{Logger, TracingLogger};
use crate::request::RequestHead;
use crate::router::Router;
use crate::thrown::{Thrown, WrappedError};

/// Request and error logging middleware.
///
/// ```rust,no_run
/// use ssr_log::{LogConfig, LogOptions, Router};
/// use ssr_log::middleware::AccessLog;
///
/// # fn main() -> Result<(), ssr_log::Error> {
/// let cfg = LogConfig::resolve(LogOptions::from_env()?, LogOptions::default());
/// let app = AccessLog::from_config(&cfg)?.register(Router::new());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AccessLog {
    logger: Arc<dyn Logger>,
    classify: ClassifyOptions,
}

impl AccessLog {
    pub fn new(logger: Arc<dyn Logger>, classify: ClassifyOptions) -> Self {
        Self { logger, classify }
    }

    /// Builds the JSON [`TracingLogger`] `cfg` describes and wraps it.
    pub fn from_config(cfg: &LogConfig) -> Result<Self, Error> {
        let logger = TracingLogger::from_config(cfg)?;
        Ok(Self::new(Arc::new(logger), cfg.classify_options()))
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Installs both hooks on `router` and hands the logger to its handlers.
    pub fn register(self, router: Router) -> Router {
        router
            .logger(Arc::clone(&self.logger))
            .hook(self.clone())
            .error_hook(self)
    }
}

impl RequestHook for AccessLog {
    fn on_request(&self, req: &RequestHead, next: Next) -> Proceed {
        let info = RequestInfo::extract(req);
        if classify::is_loggable(&info, &self.classify) {
            best_effort(|| self.logger.info(&format!("Accessed {}", info.url), &info));
        }
        next.call()
    }
}

impl ErrorHook for AccessLog {
    fn on_error(&self, err: Thrown, req: &RequestHead, next: ErrorNext) -> Forwarded {
        best_effort(|| {
            let wrapped = WrappedError::from_thrown(&err);
            self.logger.error(&wrapped, &RequestInfo::extract(req));
        });
        next.call(err)
    }
}

/// Runs `f`, swallowing a panic from a misbehaving logger.
fn best_effort(f: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        debug!("logger panicked, record skipped");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use http::{HeaderMap, HeaderValue, Method, Uri};

    use super::*;
    use crate::error::HandlerError;
    use crate::logger::tests::Capture;

    #[derive(Debug, Clone)]
    pub(crate) enum Record {
        Info(String, RequestInfo),
        Error(WrappedError, RequestInfo),
    }

    /// Logger keeping every call in memory.
    #[derive(Default)]
    pub(crate) struct Recorder(pub(crate) Mutex<Vec<Record>>);

    impl Recorder {
        pub(crate) fn records(&self) -> Vec<Record> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Logger for Recorder {
        fn info(&self, message: &str, info: &RequestInfo) {
            self.0.lock().unwrap().push(Record::Info(message.to_owned(), info.clone()));
        }

        fn error(&self, error: &WrappedError, info: &RequestInfo) {
            self.0.lock().unwrap().push(Record::Error(error.clone(), info.clone()));
        }
    }

    struct Exploding;

    impl Logger for Exploding {
        fn info(&self, _: &str, _: &RequestInfo) {
            panic!("sink unavailable");
        }

        fn error(&self, _: &WrappedError, _: &RequestInfo) {
            panic!("sink unavailable");
        }
    }

    fn head(uri: &'static str, headers: &[(&'static str, &'static str)]) -> RequestHead {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.append(*k, HeaderValue::from_static(v));
        }
        RequestHead::new(Method::GET, Uri::from_static(uri), map)
    }

    fn access_log(checks: bool) -> (Arc<Recorder>, AccessLog) {
        let recorder = Arc::new(Recorder::default());
        let opts = ClassifyOptions { perform_header_checks: checks, ..ClassifyOptions::default() };
        (Arc::clone(&recorder), AccessLog::new(recorder, opts))
    }

    #[test]
    fn page_load_is_logged() {
        let (recorder, log) = access_log(true);
        let _ = log.on_request(&head("/about", &[("accept", "text/html")]), Next::new());

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Info(message, info) => {
                assert_eq!(message, "Accessed /about");
                assert_eq!(info.url, "/about");
                assert_eq!(info.header_values("accept").collect::<Vec<_>>(), ["text/html"]);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn internal_asset_is_not_logged() {
        let (recorder, log) = access_log(true);
        let _ = log.on_request(&head("/_nuxt/app.js", &[("accept", "text/html")]), Next::new());
        assert!(recorder.records().is_empty());
    }

    #[test]
    fn header_checks_off_logs_everything() {
        let (recorder, log) = access_log(false);
        let _ = log.on_request(&head("/_nuxt/app.js", &[("accept", "*/*")]), Next::new());
        let _ = log.on_request(&head("/logo.png", &[]), Next::new());
        assert_eq!(recorder.records().len(), 2);
    }

    #[test]
    fn error_is_logged_with_its_stack_and_forwarded_untouched() {
        let (recorder, log) = access_log(true);
        let err = HandlerError::msg("boom").with_stack("Error: boom\n at foo");
        let original = err.get_ref() as *const _ as *const ();

        let forwarded = log
            .on_error(Thrown::from(err), &head("/checkout", &[]), ErrorNext::new())
            .into_inner();

        match forwarded {
            Thrown::Error(e) => {
                assert_eq!(e.get_ref() as *const _ as *const (), original);
                assert_eq!(e.stack(), Some("Error: boom\n at foo"));
            }
            Thrown::Panic(_) => panic!("variant changed"),
        }

        match &recorder.records()[0] {
            Record::Error(wrapped, info) => {
                assert_eq!(wrapped.message, "boom");
                assert_eq!(wrapped.stack.as_deref(), Some("Error: boom\n at foo"));
                assert_eq!(info.url, "/checkout");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn string_panic_is_logged_and_forwarded() {
        let (recorder, log) = access_log(true);

        let forwarded = log
            .on_error(Thrown::Panic(Box::new("plain")), &head("/", &[]), ErrorNext::new())
            .into_inner();

        match forwarded {
            Thrown::Panic(payload) => assert_eq!(payload.downcast_ref::<&str>(), Some(&"plain")),
            Thrown::Error(_) => panic!("variant changed"),
        }
        assert!(matches!(
            &recorder.records()[0],
            Record::Error(w, _) if w.message == "plain" && w.stack.is_none()
        ));
    }

    #[test]
    fn failing_logger_never_blocks_the_chain() {
        let log = AccessLog::new(Arc::new(Exploding), ClassifyOptions::default());

        let _ = log.on_request(&head("/about", &[("accept", "text/html")]), Next::new());
        let forwarded = log
            .on_error(Thrown::from(HandlerError::msg("boom")), &head("/", &[]), ErrorNext::new())
            .into_inner();

        assert!(matches!(forwarded, Thrown::Error(e) if e.to_string() == "boom"));
    }

    #[test]
    fn tracing_logger_writes_access_line() {
        let capture = Capture::default();
        let logger = TracingLogger::with_writer("info", capture.clone()).unwrap();
        let log = AccessLog::new(Arc::new(logger), ClassifyOptions::default());

        let _ = log.on_request(&head("/about", &[("accept", "text/html")]), Next::new());
        let _ = log.on_request(&head("/_nuxt/app.js", &[("accept", "text/html")]), Next::new());

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "Accessed /about");
        assert_eq!(lines[0]["target"], "ssr_log::access");
    }
}
