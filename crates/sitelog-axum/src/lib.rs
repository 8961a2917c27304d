//! Request logging middleware for axum
//!
//! Logs one line when a request arrives and one when its response body has
//! been sent (or dropped unfinished):
//!
//! ```text
//! Incoming request: GET /users/7
//! GET /users/7 200 OK; 3ms
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{middleware, routing::get, Router};
//! use sitelog_core::{config::LoggerSettings, Loggers};
//!
//! # fn build() -> Result<Router, Box<dyn std::error::Error>> {
//! let loggers = Loggers::init(&LoggerSettings::from_env()?)?;
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "hello" }))
//!     .layer(middleware::from_fn_with_state(
//!         Arc::clone(&loggers.log),
//!         sitelog_axum::request_logging,
//!     ));
//! # Ok(app)
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use futures::StreamExt;
use sitelog_core::{Dispatch, LogResult, Logger};

/// Log arrival and completion of every request
///
/// The completion line is written when the response body stream ends, so the
/// elapsed time covers streamed bodies. Response trailers are not forwarded.
/// Logging failures are reported on stderr and never affect the response.
pub async fn request_logging(
    State(logger): State<Arc<Logger>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    report(logger.info(arrival_line(&method, &target)));

    let (parts, body) = next.run(request).await.into_parts();
    let completion = Completion {
        logger,
        method,
        target,
        status: parts.status,
        started,
    };
    let body = body.into_data_stream().map(move |chunk| {
        let _pending = &completion;
        chunk
    });

    Response::from_parts(parts, Body::from_stream(body))
}

/// Writes the completion line when the response body is dropped
struct Completion {
    logger: Arc<Logger>,
    method: Method,
    target: String,
    status: StatusCode,
    started: Instant,
}

impl Drop for Completion {
    fn drop(&mut self) {
        report(self.logger.info(completion_line(
            &self.method,
            &self.target,
            self.status,
            self.started.elapsed(),
        )));
    }
}

/// `Incoming request: <method> <target>`
pub fn arrival_line(method: &Method, target: &str) -> String {
    format!("Incoming request: {} {}", method, target)
}

/// `<method> <target> <status> <reason>; <elapsed>ms`
pub fn completion_line(method: &Method, target: &str, status: StatusCode, elapsed: Duration) -> String {
    format!(
        "{} {} {} {}; {}ms",
        method,
        target,
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        elapsed.as_millis()
    )
}

fn report(result: LogResult<Dispatch>) {
    if let Err(e) = result {
        eprintln!("sitelog: request logging failed: {}", e);
    }
}
