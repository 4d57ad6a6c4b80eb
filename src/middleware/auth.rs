use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::{Request, State},
    body::Body,
};
use tower_sessions::Session;
use crate::errors::AppError;
use crate::models::{SessionState, View};
use crate::state::AppState;

fn is_public(path: &str) -> bool {
    path == "/" || path == "/login" || path.starts_with("/static/")
}

pub async fn require_auth(
    session: Session,
    req: Request<Body>,
    next: Next,
) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    match session.get::<SessionState>(SessionState::KEY).await {
        Ok(Some(state)) if state.is_authenticated() => next.run(req).await,
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            Redirect::to("/").into_response()
        }
    }
}

/// Lets a request through only when the active account may see the admin view.
pub async fn require_admin(
    State(state): State<AppState>,
    session: Session,
    req: Request<Body>,
    next: Next,
) -> Response {
    let session_state = match session.get::<SessionState>(SessionState::KEY).await {
        Ok(Some(session_state)) => session_state,
        Ok(None) => return Redirect::to("/").into_response(),
        Err(e) => return AppError::Session(e).into_response(),
    };

    match state.identity.active_account(&session_state).await {
        Some(account) if View::Admin.is_allowed_for(account.role) => next.run(req).await,
        Some(account) => {
            tracing::warn!("Account {} tried to open {}", account.username, req.uri().path());
            AppError::Forbidden("El panel de administración es solo para administradores.".into())
                .into_response()
        }
        None => Redirect::to("/").into_response(),
    }
}
