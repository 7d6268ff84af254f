//! Request middleware applied to every route served by [`HttpServer`](crate::HttpServer).

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use observability::ServerMetrics;

/// Record method, status and latency of each request.
pub async fn track_metrics(
    State(metrics): State<ServerMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let mut guard = metrics.start_request(request.method().as_str());
    let response = next.run(request).await;
    guard.set_status(response.status().as_u16());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_track_metrics_passes_response_through() {
        let app = Router::new()
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(axum::middleware::from_fn_with_state(
                ServerMetrics::new("test"),
                track_metrics,
            ));

        let response = app
            .oneshot(http::Request::builder().uri("/teapot").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
