use tracing::{info, warn, error, Level, span};
use tracing_subscriber::EnvFilter;
use tracing_appender::non_blocking::WorkerGuard;

use crate::settings::{LogFormat, LogSettings};

/// Initializes the global tracing subscriber from log settings.
///
/// Returns a worker guard when file logging is enabled; the guard must be
/// kept alive for the lifetime of the process or buffered log lines are
/// dropped on exit.
pub fn init_logging(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env()
        .add_directive(settings.level.into())
        .add_directive("reverse_proxy_balancer=debug".parse().unwrap());

    match &settings.dir {
        None => {
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            match settings.format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Text => builder.init(),
            }
            None
        }
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "proxy.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(writer)
                .with_ansi(false);
            match settings.format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Text => builder.init(),
            }
            Some(guard)
        }
    }
}

#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub client: String,
    pub status_code: u16,
    pub duration_ms: u64,
    pub backend_url: Option<String>,
    pub error: Option<String>,
}

impl RequestLog {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            client: String::new(),
            status_code: 0,
            duration_ms: 0,
            backend_url: None,
            error: None,
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>, client: &str) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();
        self.client = client.to_string();

        info!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            client = %self.client,
            "Received request"
        );
    }

    pub fn with_response(&mut self, status: hyper::StatusCode) {
        self.status_code = status.as_u16();
    }

    pub fn with_backend(&mut self, url: &str) {
        self.backend_url = Some(url.to_string());
        info!(
            request_id = %self.request_id,
            backend = %url,
            "Selected backend"
        );
    }

    pub fn with_error(&mut self, error: impl std::fmt::Display) {
        let error_msg = error.to_string();
        error!(
            request_id = %self.request_id,
            error = %error_msg,
            "Request error occurred"
        );
        self.error = Some(error_msg);
    }
}

pub fn log_request(log: &RequestLog) {
    let level = if log.error.is_some() {
        Level::ERROR
    } else if log.status_code >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    let span = span!(
        Level::INFO,
        "request",
        request_id = %log.request_id,
        method = %log.method,
        path = %log.path,
        client = %log.client,
        status = %log.status_code,
        duration_ms = %log.duration_ms
    );
    let _enter = span.enter();

    match level {
        Level::ERROR => error!(
            backend = ?log.backend_url,
            error = ?log.error,
            "Request failed"
        ),
        Level::WARN => warn!(
            backend = ?log.backend_url,
            "Request completed with warning"
        ),
        _ => info!(
            backend = ?log.backend_url,
            "Request completed successfully"
        ),
    }
}
