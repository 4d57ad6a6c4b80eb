use axum::{
    response::{IntoResponse, Response, Redirect},
    http::StatusCode,
};
use urlencoding;
use crate::errors::{AppError, ExportError};

pub const IMPORT_ALERT: &str = "Error al procesar el archivo Excel. Por favor, asegúrese de que sea un archivo .xlsx válido y que los datos estén en las celdas correctas.";
pub const IMAGE_ALERT: &str = "No se pudo leer la imagen. Por favor, seleccione un archivo de imagen válido.";
pub const EXPORT_ALERT: &str = "No se pudo generar el PDF.";

/// Redirect back to the quote workspace with a blocking notice.
pub fn alert_redirect(message: &str) -> Response {
    Redirect::to(&format!("/quotes?alert={}", urlencoding::encode(message))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Authentication errors go back to the login page
            AppError::Auth(msg) => {
                tracing::debug!("Authentication required: {}", msg);
                Redirect::to(&format!("/?error={}", urlencoding::encode(&msg)))
                    .into_response()
            }

            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                format!("Forbidden: {}", msg)
            ).into_response(),

            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Validation error: {}", msg)
            ).into_response(),

            AppError::NotReady(msg) => (
                StatusCode::CONFLICT,
                format!("Export not available: {}", msg)
            ).into_response(),

            // User-facing input and export failures surface as a single alert
            AppError::Upload(msg) => {
                tracing::warn!("Upload rejected: {}", msg);
                alert_redirect(IMAGE_ALERT)
            }

            AppError::Import(e) => {
                tracing::warn!("Spreadsheet import failed: {}", e);
                alert_redirect(IMPORT_ALERT)
            }

            AppError::Export(e) => convert_export_error(e),

            // Everything else is an internal failure
            AppError::Session(e) => internal("Session error", &e.to_string()),
            AppError::Storage(msg) => internal("Storage error", &msg),
            AppError::Redis(e) => internal("Database error", &e.to_string()),
            AppError::File(e) => internal("File error", &e.to_string()),
        }
    }
}

fn internal(kind: &str, detail: &str) -> Response {
    tracing::error!("{}: {}", kind, detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{}: {}", kind, detail)
    ).into_response()
}

fn convert_export_error(err: ExportError) -> Response {
    match err {
        ExportError::Timeout(seconds) => {
            tracing::error!("PDF export timed out after {} seconds", seconds);
        }
        ExportError::TaskPanic(ref msg) => {
            tracing::error!("PDF export panicked: {}", msg);
        }
        ref other => {
            tracing::error!("PDF export failed: {}", other);
        }
    }
    alert_redirect(EXPORT_ALERT)
}
