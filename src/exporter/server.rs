// src/exporter/server.rs

//! HTTP endpoint for the scraper
//!
//! Serves the text exposition format on the telemetry path and a small
//! index page on `/`. Each scrape gathers on the blocking pool, since
//! polling the miners is synchronous socket I/O.
use crate::utils::error::ExporterError;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use prometheus::{Encoder, Registry, TEXT_FORMAT, TextEncoder};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Everything a request handler needs
pub struct ServerState {
    /// Registry holding the miner exporter
    pub registry: Registry,
    /// Path the scraper requests, e.g. `/metrics`
    pub telemetry_path: String,
}

/// Runs the HTTP server until Ctrl-C
///
/// # Errors
/// Returns `ExporterError::HttpError` if the address cannot be bound or
/// the server fails
pub async fn serve(addr: SocketAddr, state: Arc<ServerState>) -> Result<(), ExporterError> {
    let make_service = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(Arc::clone(&state), req)))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_service);
    log::info!("Starting HTTP server on {}", addr);

    server
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
            log::info!("Shutting down");
        })
        .await?;

    Ok(())
}

/// Routes one request
pub async fn handle(
    state: Arc<ServerState>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    if req.method() != Method::GET {
        return Ok(respond(
            StatusCode::METHOD_NOT_ALLOWED,
            "text/plain",
            "Method not allowed\n",
        ));
    }

    let path = req.uri().path().to_string();
    if path == state.telemetry_path {
        return Ok(match scrape(&state).await {
            Ok(body) => respond(StatusCode::OK, TEXT_FORMAT, body),
            Err(e) => {
                log::error!("Scrape failed: {}", e);
                respond(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "text/plain",
                    format!("{}\n", e),
                )
            }
        });
    }

    if path == "/" {
        return Ok(respond(
            StatusCode::OK,
            "text/html; charset=utf-8",
            index_page(&state.telemetry_path),
        ));
    }

    Ok(respond(StatusCode::NOT_FOUND, "text/plain", "Not found\n"))
}

/// Gathers and encodes every registered family
///
/// Per-miner poll deadlines are enforced by the exporter, so a slow miner
/// only costs its own series.
///
/// # Errors
/// Returns `ExporterError::TaskError` if the gather task panics, or an
/// encoding error
async fn scrape(state: &ServerState) -> Result<Vec<u8>, ExporterError> {
    let registry = state.registry.clone();
    let families = tokio::task::spawn_blocking(move || registry.gather()).await?;

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(buffer)
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn index_page(telemetry_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>Miner Exporter</title></head>\n\
         <body>\n\
         <h1>Miner Exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        telemetry_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Collector;
    use crate::exporter::{MinerExporter, MinerTarget};
    use crate::stats::{Algorithm, Metrics, Rates, Shares};
    use std::time::Duration;

    struct Slow(Duration);

    impl Collector for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn collect(&self) -> Result<Metrics, ExporterError> {
            std::thread::sleep(self.0);
            Ok(Metrics {
                version: "1".into(),
                uptime_seconds: 1.0,
                algorithms: vec![Algorithm {
                    name: "decred".into(),
                    shares: Shares::default(),
                    rates: Rates::summed(vec![1.0]),
                }],
            })
        }
    }

    fn target(name: &str, delay: Duration) -> MinerTarget {
        MinerTarget {
            name: name.into(),
            collector: Arc::new(Slow(delay)),
        }
    }

    fn state_with(targets: Vec<MinerTarget>, timeout: Duration) -> Arc<ServerState> {
        let registry = Registry::new();
        let exporter = MinerExporter::new(targets, timeout).unwrap();
        registry.register(Box::new(exporter)).unwrap();

        Arc::new(ServerState {
            registry,
            telemetry_path: "/metrics".into(),
        })
    }

    fn state(delay: Duration, timeout: Duration) -> Arc<ServerState> {
        state_with(vec![target("rig", delay)], timeout)
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn serves_metrics() {
        let state = state(Duration::ZERO, Duration::from_secs(5));
        let response = handle(state, get("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT_FORMAT);
        let text = body_text(response).await;
        assert!(text.contains(r#"miner_up{miner="rig"} 1"#));
    }

    #[tokio::test]
    async fn index_links_telemetry_path() {
        let state = state(Duration::ZERO, Duration::from_secs(5));
        let response = handle(state, get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("href='/metrics'"));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let state = state(Duration::ZERO, Duration::from_secs(5));
        let response = handle(state, get("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_non_get() {
        let state = state(Duration::ZERO, Duration::from_secs(5));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = handle(state, req).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn slow_miner_reads_as_down() {
        let state = state_with(
            vec![
                target("healthy", Duration::ZERO),
                target("hung", Duration::from_millis(500)),
            ],
            Duration::from_millis(100),
        );
        let response = handle(state, get("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains(r#"miner_up{miner="healthy"} 1"#));
        assert!(text.contains(r#"miner_up{miner="hung"} 0"#));
    }
}
