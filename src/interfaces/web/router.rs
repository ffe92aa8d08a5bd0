use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header},
    middleware,
    middleware::Next,
    routing::post,
};

use super::AppState;
use super::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/tasks/create", post(handlers::create_task))
        .route("/api/tasks/get", post(handlers::get_task))
        .route("/api/tasks/delete", post(handlers::delete_task))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}
