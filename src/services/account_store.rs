use bcrypt::hash;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, NewAccount, Role};
use super::repository::AccountRepository;

/// Ordered account collection, mirrored in memory and rewritten in full to
/// the repository on every addition.
#[derive(Clone)]
pub struct AccountStore {
    repository: Arc<dyn AccountRepository>,
    accounts: Arc<RwLock<Vec<Account>>>,
    bcrypt_cost: u32,
}

impl AccountStore {
    /// Loads the persisted collection. An empty repository, or one holding
    /// something that does not parse, is replaced by the default accounts.
    pub async fn open(repository: Arc<dyn AccountRepository>, bcrypt_cost: u32) -> AppResult<Self> {
        let loaded = match repository.load().await? {
            Some(document) => match serde_json::from_str::<Vec<Account>>(&document) {
                Ok(accounts) => Some(accounts),
                Err(e) => {
                    tracing::warn!("Stored accounts are unreadable, reseeding defaults: {}", e);
                    None
                }
            },
            None => None,
        };

        let accounts = match loaded {
            Some(accounts) => {
                tracing::info!("Loaded {} accounts", accounts.len());
                accounts
            }
            None => {
                let seeded = default_accounts(bcrypt_cost)?;
                repository.save(serde_json::to_string(&seeded)?).await?;
                tracing::info!("Seeded {} default accounts", seeded.len());
                seeded
            }
        };

        Ok(Self {
            repository,
            accounts: Arc::new(RwLock::new(accounts)),
            bcrypt_cost,
        })
    }

    pub async fn list(&self) -> Vec<Account> {
        self.accounts.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Account> {
        self.accounts.read().await.iter().find(|a| a.id == id).cloned()
    }

    /// All accounts carrying `username`, in insertion order. Usernames are
    /// not unique, so this may return more than one.
    pub async fn find_by_username(&self, username: &str) -> Vec<Account> {
        self.accounts
            .read()
            .await
            .iter()
            .filter(|a| a.username == username)
            .cloned()
            .collect()
    }

    pub async fn create(&self, new_account: NewAccount) -> AppResult<Account> {
        let username = new_account.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::Validation("El nombre de usuario es obligatorio.".into()));
        }
        if new_account.password.is_empty() {
            return Err(AppError::Validation("La contraseña es obligatoria.".into()));
        }

        let password_hash = hash(new_account.password.as_bytes(), self.bcrypt_cost)?;

        let mut accounts = self.accounts.write().await;
        let account = Account {
            id: fresh_id(&accounts),
            name: new_account.name,
            username,
            password_hash,
            role: new_account.role,
            title: new_account.title,
            address: new_account.address,
            phone: new_account.phone,
        };

        let mut updated = accounts.clone();
        updated.push(account.clone());
        self.repository.save(serde_json::to_string(&updated)?).await?;
        *accounts = updated;

        tracing::info!("Created {} account {} ({})", account.role, account.username, account.id);
        Ok(account)
    }
}

// Timestamp identifier, suffixed when it collides with an existing one.
fn fresh_id(existing: &[Account]) -> String {
    let base = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
    let taken = |candidate: &str| existing.iter().any(|a| a.id == candidate);

    if !taken(&base) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn default_accounts(bcrypt_cost: u32) -> AppResult<Vec<Account>> {
    Ok(vec![
        Account {
            id: "1".into(),
            name: "Admin User".into(),
            username: "admin".into(),
            password_hash: hash("password", bcrypt_cost)?,
            role: Role::Admin,
            title: "General Manager".into(),
            address: "123 Main St, Anytown".into(),
            phone: "555-123-4567".into(),
        },
        Account {
            id: "2".into(),
            name: "Federico Lugones".into(),
            username: "federico".into(),
            password_hash: hash("password", bcrypt_cost)?,
            role: Role::Seller,
            title: "Asesor Comercial".into(),
            address: "Angel Gallardo 155 - CABA".into(),
            phone: "11-5571-4614".into(),
        },
    ])
}
