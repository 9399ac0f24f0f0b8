//! Webhook HTTP handler.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use octocord_core::{ChatSession, DeliverySink, DispatchError, Dispatcher, WebhookRequest};

/// Dispatcher shared across requests.
pub type AppState<S, D> = Arc<Dispatcher<S, D>>;

/// Build the HTTP router.
pub fn router<S, D>(dispatcher: AppState<S, D>) -> Router
where
    S: ChatSession + 'static,
    D: DeliverySink + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/github-webhook", post(github_webhook_handler::<S, D>))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GitHub webhook handler.
///
/// Answers 401 for a bad signature and 400 for a request we cannot read.
/// Everything else is acknowledged with 200, including events that produced
/// no notification or whose delivery failed.
async fn github_webhook_handler<S, D>(
    State(dispatcher): State<AppState<S, D>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), AppError>
where
    S: ChatSession + 'static,
    D: DeliverySink + 'static,
{
    let request = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
        .fold(WebhookRequest::new(body.to_vec()), |req, (name, value)| {
            req.with_header(name, value)
        });

    dispatcher.handle(&request).await?;
    Ok((StatusCode::OK, "OK"))
}

/// Rejected webhook request.
#[derive(Debug)]
pub struct AppError(DispatchError);

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            DispatchError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Invalid signature"),
            DispatchError::MissingEventHeader => {
                (StatusCode::BAD_REQUEST, "Missing X-GitHub-Event header")
            }
            DispatchError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "Invalid JSON payload"),
        };
        (status, message).into_response()
    }
}
