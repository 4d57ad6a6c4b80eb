use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Seller,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered identity, as persisted in the account collection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password_hash: String,  // bcrypt, never the plain secret
    pub role: Role,
    pub title: String,
    pub address: String,
    pub phone: String,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Account fields supplied by the admin form, before an id and hash are assigned.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub title: String,
    pub address: String,
    pub phone: String,
}
