//! Tower middleware for the HTTP boundary.
//!
//! - [`correlation_id_layer`]: read or create an `X-Correlation-ID`, run the
//!   request inside a tracing span carrying it and echo it on the response.
//! - [`matrix_params_layer`]: strip `;key=value` matrix parameters from path
//!   segments before routing and expose them as [`MatrixParams`].
//!
//! Matrix parameters have to be removed before the router sees the path, so
//! [`matrix_params_layer`] wraps the whole router rather than being added with
//! `Router::layer`:
//!
//! ```
//! use axum::{routing::get, Router};
//! use todo_fanout_web::middleware::matrix_params_layer;
//! use tower::Layer;
//!
//! let routes: Router = Router::new().route("/todos", get(|| async { "ok" }));
//! let app: Router = Router::new().fallback_service(matrix_params_layer().layer(routes));
//! ```

use axum::{
    extract::Request,
    http::{HeaderValue, Uri},
    response::Response,
};
use std::collections::HashMap;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

/// Correlation id of the current request, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(CorrelationId(correlation_id));

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

/// Matrix parameters found on the request path, keyed by name.
///
/// When a name appears on several segments the right-most value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixParams(pub HashMap<String, String>);

impl MatrixParams {
    /// Value of parameter `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Create a layer that moves matrix parameters out of the request path.
#[must_use]
pub const fn matrix_params_layer() -> MatrixParamsLayer {
    MatrixParamsLayer
}

/// Layer for matrix parameter extraction.
#[derive(Clone, Debug)]
pub struct MatrixParamsLayer;

impl<S> Layer<S> for MatrixParamsLayer {
    type Service = MatrixParamsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MatrixParamsMiddleware { inner }
    }
}

/// Middleware service for matrix parameter extraction.
#[derive(Clone, Debug)]
pub struct MatrixParamsMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for MatrixParamsMiddleware<S>
where
    S: Service<Request>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        if let Some((uri, params)) = strip_matrix_params(req.uri()) {
            *req.uri_mut() = uri;
            req.extensions_mut().insert(params);
        }
        self.inner.call(req)
    }
}

/// Split `;key=value` pairs off every path segment.
///
/// Returns `None` when the path carries no matrix parameters or the rewritten
/// URI would be invalid.
fn strip_matrix_params(uri: &Uri) -> Option<(Uri, MatrixParams)> {
    let path = uri.path();
    if !path.contains(';') {
        return None;
    }

    let mut params = HashMap::new();
    let segments: Vec<&str> = path
        .split('/')
        .map(|segment| {
            let mut parts = segment.split(';');
            let name = parts.next().unwrap_or_default();
            for pair in parts.filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                params.insert(key.to_string(), value.to_string());
            }
            name
        })
        .collect();

    let mut path_and_query = segments.join("/");
    if let Some(query) = uri.query() {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    let uri = Uri::from_parts(parts).ok()?;

    Some((uri, MatrixParams(params)))
}
