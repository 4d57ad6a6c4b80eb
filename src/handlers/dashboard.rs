use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Response, Redirect},
    http::StatusCode,
};
use tower_sessions::Session;
use crate::errors::{AppError, AppResult};
use crate::models::{NewAccountForm, View};
use crate::state::AppState;
use super::{active_user, pages, save_session_state, PageQuery};

pub async fn serve_admin_dashboard(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let mut active = active_user(&state, &session).await?;
    tracing::info!("Accessing admin dashboard as {}", active.account.username);

    // Opening the directory directly still counts as selecting the admin view
    if active.session_state.view != View::Admin {
        let next = active
            .session_state
            .view
            .transition(active.account.role, View::Admin)
            .ok_or_else(|| AppError::Forbidden("El panel de administración es solo para administradores.".into()))?;
        active.session_state.view = next;
        save_session_state(&session, &active.session_state).await?;
    }

    let accounts = state.accounts.list().await;
    tracing::debug!("Listing {} accounts", accounts.len());

    let html = pages::load_template("admin.html")?
        .replace("{{header}}", &pages::header_bar(&active.account))
        .replace("{{menu}}", &pages::menu(&active.account, View::Admin))
        .replace("{{error}}", &pages::inline_error(query.error.as_deref()))
        .replace("{{accounts}}", &pages::account_rows(&accounts));

    Ok(Html(html).into_response())
}

pub async fn create_account(
    State(state): State<AppState>,
    Form(form): Form<NewAccountForm>,
) -> AppResult<Response> {
    match state.accounts.create(form.into()).await {
        Ok(account) => {
            tracing::info!("Admin created account {}", account.username);
            Ok(Redirect::to("/admin").into_response())
        }
        Err(AppError::Validation(msg)) => {
            Ok(Redirect::to(&format!("/admin?error={}", urlencoding::encode(&msg))).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Menu navigation between the quote workspace and the admin directory.
pub async fn select_view(
    State(state): State<AppState>,
    session: Session,
    Path(view_name): Path<String>,
) -> AppResult<Response> {
    let Some(requested) = View::from_name(&view_name) else {
        return Ok((StatusCode::NOT_FOUND, format!("Unknown view: {}", view_name)).into_response());
    };

    let mut active = active_user(&state, &session).await?;
    match active.session_state.view.transition(active.account.role, requested) {
        Some(next) => {
            active.session_state.view = next;
            save_session_state(&session, &active.session_state).await?;
            Ok(Redirect::to(next.path()).into_response())
        }
        None => {
            tracing::warn!("Account {} may not open the {:?} view", active.account.username, requested);
            Err(AppError::Forbidden("El panel de administración es solo para administradores.".into()))
        }
    }
}
