//! Metrics HTTP Server
//!
//! Serves the exporter over HTTP/1:
//!
//! | Path                  | Response                                      |
//! |-----------------------|-----------------------------------------------|
//! | `/metrics`            | one fresh scrape, Prometheus text format      |
//! | `/healthz`, `/livez`  | `200 ok`                                      |
//! | `/readyz`             | `200 ok`, or `503` after a failed collection  |
//! | anything else         | `404`                                         |

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::metrics::Exporter;

/// Response body type used by every route.
pub type Body = Full<Bytes>;

/// Accept connections on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, exporter: Arc<Exporter>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let (stream, _) = tokio::select! {
            accepted = listener.accept() => accepted
                .map_err(|e| Error::Internal(format!("Metrics server accept error: {}", e)))?,
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                return Ok(());
            }
        };

        let io = TokioIo::new(stream);
        let exporter = exporter.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle(req, exporter.clone()));
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Metrics server connection error: {}", e);
            }
        });
    }
}

async fn handle(
    req: Request<hyper::body::Incoming>,
    exporter: Arc<Exporter>,
) -> std::result::Result<Response<Body>, Infallible> {
    let path = req.uri().path().to_owned();
    Ok(respond(&path, &exporter).await)
}

/// Route a request path to its response.
pub async fn respond(path: &str, exporter: &Exporter) -> Response<Body> {
    match path {
        "/metrics" => match exporter.scrape().await {
            Ok(text) => text_response(StatusCode::OK, prometheus::TEXT_FORMAT, text),
            Err(e) => {
                error!("Failed to render metrics: {}", e);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, "text/plain", e.to_string())
            }
        },
        "/healthz" | "/livez" => text_response(StatusCode::OK, "text/plain", "ok".into()),
        "/readyz" if exporter.is_healthy() => {
            text_response(StatusCode::OK, "text/plain", "ok".into())
        }
        "/readyz" => text_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "text/plain",
            "last collection failed".into(),
        ),
        _ => text_response(StatusCode::NOT_FOUND, "text/plain", "not found".into()),
    }
}

fn text_response(status: StatusCode, content_type: &'static str, body: String) -> Response<Body> {
    let mut response = Response::new(Body::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
