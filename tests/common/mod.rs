//! Shared utilities for the relay integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use webhook_relay::config::RelayConfig;
use webhook_relay::http::HttpServer;
use webhook_relay::routing::RouteTable;

/// A request as the mock upstream saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Requests received by the mock upstream, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Captured>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<Captured> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn last(&self) -> Captured {
        self.requests().pop().expect("upstream received no request")
    }

    async fn capture(&self, request: Request<Body>) -> Captured {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let captured = Captured {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: parts.headers,
            body,
        };
        self.0.lock().unwrap().push(captured.clone());
        captured
    }
}

/// Start a mock upstream on an ephemeral port.
///
/// - `/x`: 201 with `X-Id: 42` and a JSON body
/// - `/echo`: 200 echoing the request body
/// - `/redirect`: 302 to `https://elsewhere.example/next`
/// - `/chunked`: 200 with a body streamed in several chunks
pub async fn start_upstream() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/x", any(created))
        .route("/echo", any(echo))
        .route("/redirect", any(redirect))
        .route("/chunked", any(chunked))
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorder)
}

async fn created(State(recorder): State<Recorder>, request: Request<Body>) -> Response {
    recorder.capture(request).await;
    (
        StatusCode::CREATED,
        [("x-id", "42"), ("content-type", "application/json")],
        r#"{"ok":true}"#,
    )
        .into_response()
}

async fn echo(State(recorder): State<Recorder>, request: Request<Body>) -> Response {
    let captured = recorder.capture(request).await;
    (StatusCode::OK, captured.body).into_response()
}

async fn redirect(State(recorder): State<Recorder>, request: Request<Body>) -> Response {
    recorder.capture(request).await;
    (
        StatusCode::FOUND,
        [(header::LOCATION, "https://elsewhere.example/next")],
    )
        .into_response()
}

async fn chunked(State(recorder): State<Recorder>, request: Request<Body>) -> Response {
    recorder.capture(request).await;
    let chunks = ["first,", "second,", "third"]
        .into_iter()
        .map(|chunk| Ok::<_, std::io::Error>(Bytes::from_static(chunk.as_bytes())));
    Response::new(Body::from_stream(futures_util::stream::iter(chunks)))
}

/// An address nothing is listening on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Test configuration: system proxies off so loopback traffic stays local.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.forwarding.system_proxy = false;
    config
}

/// Build the relay router for a JSON route table.
pub fn relay(routes: &str) -> Router {
    relay_with(routes, test_config())
}

/// Build the relay router for a JSON route table and custom settings.
pub fn relay_with(routes: &str, config: RelayConfig) -> Router {
    let table = Arc::new(RouteTable::from_config_value(Some(routes)));
    HttpServer::new(&config, table).unwrap().router()
}

/// Read a response body to completion.
pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}
