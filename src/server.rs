//! HTTP surface: `/metrics`, `/debug/blu` and health checks.

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::collector::BluCollector;

/// Path serving the Prometheus exposition.
pub const METRICS_PATH: &str = "/metrics";
/// Path serving the merged attributes as JSON.
pub const DEBUG_PATH: &str = "/debug/blu";

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Accept connections until `shutdown` resolves.
///
/// Each connection runs on its own task; a failed accept or connection is
/// logged and does not stop the loop.
pub async fn serve<F>(
    listener: TcpListener,
    collector: Arc<BluCollector>,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => return Ok(()),
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            },
        };
        let io = TokioIo::new(stream);
        let collector = collector.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let collector = collector.clone();
                async move { Ok::<_, Infallible>(route(req.uri().path(), &collector).await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %e, "Connection error");
            }
        });
    }
}

/// Answer one request by path.
pub async fn route(path: &str, collector: &BluCollector) -> Response<Full<Bytes>> {
    match path {
        METRICS_PATH => match collector.scrape().await {
            Ok(body) => respond(StatusCode::OK, blutrv_metrics::CONTENT_TYPE, body),
            Err(e) => fetch_failed(e),
        },
        DEBUG_PATH => match collector.debug_snapshot().await {
            Ok(body) => respond(StatusCode::OK, JSON_CONTENT_TYPE, body),
            Err(e) => fetch_failed(e),
        },
        "/health" | "/healthz" => respond(StatusCode::OK, TEXT_CONTENT_TYPE, "OK"),
        _ => respond(StatusCode::NOT_FOUND, TEXT_CONTENT_TYPE, "Not Found"),
    }
}

fn fetch_failed(error: impl std::fmt::Display) -> Response<Full<Bytes>> {
    warn!(error = %error, "Error fetching blu components");
    respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        TEXT_CONTENT_TYPE,
        format!("error fetching blu components: {error}"),
    )
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
