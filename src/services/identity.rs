use bcrypt::verify;
use crate::models::{Account, SessionState};
use super::account_store::AccountStore;
use super::workspace::WorkspaceService;

/// Checks credentials against the account store and manages the active
/// account of a session.
#[derive(Clone)]
pub struct IdentityGate {
    accounts: AccountStore,
    workspaces: WorkspaceService,
}

impl IdentityGate {
    pub fn new(accounts: AccountStore, workspaces: WorkspaceService) -> Self {
        Self { accounts, workspaces }
    }

    /// Activates the first account whose username and password both match.
    /// On failure the session is left exactly as it was.
    pub async fn authenticate(&self, session: &mut SessionState, username: &str, password: &str) -> Option<Account> {
        let account = self
            .accounts
            .find_by_username(username)
            .await
            .into_iter()
            .find(|candidate| match verify(password, &candidate.password_hash) {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::warn!("Unverifiable password hash for account {}: {}", candidate.id, e);
                    false
                }
            })?;

        if let Some(previous) = session.workspace_id.take() {
            self.workspaces.remove(&previous).await;
        }
        let workspace_id = self.workspaces.create(&account.id).await;
        session.login(account.id.clone(), workspace_id);

        tracing::info!("Account {} logged in", account.username);
        Some(account)
    }

    pub async fn logout(&self, session: &mut SessionState) {
        if let Some(workspace_id) = session.logout() {
            self.workspaces.remove(&workspace_id).await;
        }
    }

    /// The account currently active in `session`, if it still exists.
    pub async fn active_account(&self, session: &SessionState) -> Option<Account> {
        match &session.account_id {
            Some(id) => self.accounts.get(id).await,
            None => None,
        }
    }

    /// Accounts `active` may attribute a quote to: admins pick any seller or
    /// themselves, sellers only themselves.
    pub async fn seller_options(&self, active: &Account) -> Vec<Account> {
        if !active.is_admin() {
            return vec![active.clone()];
        }
        let mut options: Vec<Account> = self
            .accounts
            .list()
            .await
            .into_iter()
            .filter(|a| !a.is_admin())
            .collect();
        options.push(active.clone());
        options
    }

    pub async fn may_present_as(&self, active: &Account, seller_id: &str) -> bool {
        self.seller_options(active).await.iter().any(|a| a.id == seller_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewAccount, Role};
    use crate::services::MemoryAccountRepository;
    use std::sync::Arc;

    async fn gate() -> (IdentityGate, AccountStore, WorkspaceService) {
        let store = AccountStore::open(Arc::new(MemoryAccountRepository::default()), 4).await.unwrap();
        let workspaces = WorkspaceService::new();
        (IdentityGate::new(store.clone(), workspaces.clone()), store, workspaces)
    }

    fn new_account(username: &str, password: &str, role: Role) -> NewAccount {
        NewAccount {
            name: username.to_uppercase(),
            username: username.into(),
            password: password.into(),
            role,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn every_stored_account_authenticates() {
        let (gate, store, _) = gate().await;
        store.create(new_account("laura", "clave1", Role::Seller)).await.unwrap();
        store.create(new_account("jefe", "clave2", Role::Admin)).await.unwrap();

        let credentials = [
            ("admin", "password"),
            ("federico", "password"),
            ("laura", "clave1"),
            ("jefe", "clave2"),
        ];
        for (account, (username, password)) in store.list().await.into_iter().zip(credentials) {
            let mut session = SessionState::default();
            let active = gate.authenticate(&mut session, username, password).await;
            assert_eq!(active.as_ref(), Some(&account));
            assert_eq!(session.account_id.as_deref(), Some(account.id.as_str()));
            assert!(session.workspace_id.is_some());
        }
    }

    #[tokio::test]
    async fn wrong_credentials_leave_session_untouched() {
        let (gate, _, _) = gate().await;
        let mut session = SessionState::default();
        gate.authenticate(&mut session, "federico", "password").await.unwrap();
        let before = session.clone();

        for (username, password) in [("federico", "nope"), ("nobody", "password"), ("", "")] {
            assert!(gate.authenticate(&mut session, username, password).await.is_none());
            assert_eq!(session, before);
        }
    }

    #[tokio::test]
    async fn duplicate_username_matches_on_password() {
        let (gate, store, _) = gate().await;
        let twin = store.create(new_account("federico", "otra", Role::Seller)).await.unwrap();

        let mut session = SessionState::default();
        let active = gate.authenticate(&mut session, "federico", "otra").await.unwrap();
        assert_eq!(active.id, twin.id);
    }

    #[tokio::test]
    async fn logout_clears_account_and_workspace() {
        let (gate, _, workspaces) = gate().await;
        let mut session = SessionState::default();
        gate.authenticate(&mut session, "admin", "password").await.unwrap();
        let workspace_id = session.workspace_id.clone().unwrap();

        gate.logout(&mut session).await;
        assert!(!session.is_authenticated());
        assert!(workspaces.get(&workspace_id).await.is_none());

        // Logging out twice is harmless
        gate.logout(&mut session).await;
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn sellers_may_only_present_themselves() {
        let (gate, store, _) = gate().await;
        let accounts = store.list().await;
        let (admin, federico) = (&accounts[0], &accounts[1]);

        assert!(gate.may_present_as(federico, &federico.id).await);
        assert!(!gate.may_present_as(federico, &admin.id).await);

        assert!(gate.may_present_as(admin, &federico.id).await);
        assert!(gate.may_present_as(admin, &admin.id).await);
        assert!(!gate.may_present_as(admin, "missing").await);
    }
}
