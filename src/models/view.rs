use serde::{Deserialize, Serialize};
use super::account::Role;

/// Top-level screen of a logged-in session.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Quotes,
    Admin,
}

impl View {
    pub fn from_name(name: &str) -> Option<View> {
        match name {
            "quotes" => Some(View::Quotes),
            "admin" => Some(View::Admin),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            View::Quotes => "/quotes",
            View::Admin => "/admin",
        }
    }

    pub fn is_allowed_for(self, role: Role) -> bool {
        match self {
            View::Quotes => true,
            View::Admin => role == Role::Admin,
        }
    }

    /// Moves to `requested` if `role` may see it. A refused transition
    /// returns `None` and the caller keeps its current view.
    pub fn transition(self, role: Role, requested: View) -> Option<View> {
        requested.is_allowed_for(role).then_some(requested)
    }
}
