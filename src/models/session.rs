use serde::{Deserialize, Serialize};
use super::view::View;

/// Per-browser session state kept in the session store. Lives only in memory,
/// so every process start begins logged out.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SessionState {
    pub account_id: Option<String>,
    pub workspace_id: Option<String>,
    pub view: View,
}

impl SessionState {
    pub const KEY: &'static str = "user_session";

    pub fn is_authenticated(&self) -> bool {
        self.account_id.is_some()
    }

    /// Activates an account. Each login starts from the quotes view.
    pub fn login(&mut self, account_id: String, workspace_id: String) {
        self.account_id = Some(account_id);
        self.workspace_id = Some(workspace_id);
        self.view = View::Quotes;
    }

    /// Clears the active account and returns the workspace that belonged to it.
    pub fn logout(&mut self) -> Option<String> {
        self.account_id = None;
        self.view = View::Quotes;
        self.workspace_id.take()
    }
}
