use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use crate::errors::response::{alert_redirect, IMAGE_ALERT, IMPORT_ALERT};

/// Turns the body-limit rejection of an upload into the same alert a
/// malformed file gets. Other oversized requests keep the plain 413.
pub async fn alert_on_oversized_upload(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }

    tracing::warn!("Rejected oversized upload to {}", path);
    match path.as_str() {
        "/quotes/logo" | "/quotes/vehicle" => alert_redirect(IMAGE_ALERT),
        "/quotes/spreadsheet" => alert_redirect(IMPORT_ALERT),
        _ => response,
    }
}
