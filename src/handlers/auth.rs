use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Response, Redirect},
};
use tower_sessions::Session;
use crate::errors::AppResult;
use crate::models::{LoginForm, SessionState};
use crate::state::AppState;
use super::{load_session_state, pages, save_session_state, PageQuery};

pub const INVALID_CREDENTIALS: &str = "Usuario o contraseña inválidos.";

pub async fn serve_login_page(Query(query): Query<PageQuery>) -> AppResult<Response> {
    let login_html = pages::load_template("login.html")?
        .replace("{{error}}", &pages::inline_error(query.error.as_deref()));
    Ok(Html(login_html).into_response())
}

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for user: {}", login_form.username);

    let mut session_state = load_session_state(&session).await?;
    match state
        .identity
        .authenticate(&mut session_state, &login_form.username, &login_form.password)
        .await
    {
        Some(_) => {
            save_session_state(&session, &session_state).await?;
            Ok(Redirect::to(session_state.view.path()).into_response())
        }
        None => {
            tracing::info!("Rejected credentials for user: {}", login_form.username);
            Ok(Redirect::to(&format!("/?error={}", urlencoding::encode(INVALID_CREDENTIALS)))
                .into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn handle_logout(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    let mut session_state = load_session_state(&session).await?;
    state.identity.logout(&mut session_state).await;
    if let Err(e) = session.remove::<SessionState>(SessionState::KEY).await {
        tracing::warn!("Session removal error: {}", e);
    }
    Ok(Redirect::to("/").into_response())
}
