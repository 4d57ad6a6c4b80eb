use serde::Deserialize;
use super::account::{NewAccount, Role};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewAccountForm {
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}

impl From<NewAccountForm> for NewAccount {
    fn from(form: NewAccountForm) -> Self {
        NewAccount {
            name: form.name,
            username: form.username,
            password: form.password,
            role: form.role,
            title: form.title,
            address: form.address,
            phone: form.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SellerForm {
    pub seller_id: String,
}
