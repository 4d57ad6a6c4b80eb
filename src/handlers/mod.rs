mod auth;
mod dashboard;
mod pages;
mod quotes;

pub use auth::{serve_login_page, handle_login, handle_logout};
pub use dashboard::{serve_admin_dashboard, create_account, select_view};
pub use quotes::{
    serve_workspace, serve_preview, upload_logo, upload_vehicle, upload_spreadsheet,
    update_details, select_seller, reset_workspace, export_pdf,
};

use serde::Deserialize;
use tower_sessions::Session;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, SessionState};
use crate::state::AppState;

/// Optional notice carried on a redirect.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub error: Option<String>,
    pub alert: Option<String>,
}

/// The logged-in account of a request together with its session state.
pub(crate) struct ActiveUser {
    pub session_state: SessionState,
    pub account: Account,
    pub workspace_id: String,
}

pub(crate) async fn load_session_state(session: &Session) -> AppResult<SessionState> {
    Ok(session
        .get::<SessionState>(SessionState::KEY)
        .await?
        .unwrap_or_default())
}

pub(crate) async fn save_session_state(session: &Session, session_state: &SessionState) -> AppResult<()> {
    session.insert(SessionState::KEY, session_state).await?;
    Ok(())
}

pub(crate) async fn active_user(state: &AppState, session: &Session) -> AppResult<ActiveUser> {
    let mut session_state = load_session_state(session).await?;

    let account = state
        .identity
        .active_account(&session_state)
        .await
        .ok_or_else(|| AppError::Auth("Not authenticated".into()))?;

    // A session whose workspace disappeared gets a fresh one
    let workspace_id = match session_state.workspace_id.clone() {
        Some(id) if state.workspaces.get(&id).await.is_some() => id,
        _ => {
            let id = state.workspaces.create(&account.id).await;
            session_state.workspace_id = Some(id.clone());
            save_session_state(session, &session_state).await?;
            id
        }
    };

    Ok(ActiveUser { session_state, account, workspace_id })
}
