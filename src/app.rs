use std::net::SocketAddr;

use axum::{http::Uri, routing::get, Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{error::ApiError, state::AppState, users};

pub fn build_app(state: AppState) -> Router {
    let request_logging = state.config.request_logging();

    let app = Router::new()
        .route("/", get(|| async { "Api Is Running..." }))
        .nest("/api/users", users::router())
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive());

    if !request_logging {
        return app;
    }

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
            })
            .on_response(
                |res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, ?latency, "response");
                    } else {
                        tracing::info!(%status, ?latency, "response");
                    }
                },
            ),
    )
}

async fn not_found(uri: Uri) -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        ApiError::NotFound.status(),
        Json(json!({ "message": format!("Not Found - {}", uri.path()) })),
    )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
