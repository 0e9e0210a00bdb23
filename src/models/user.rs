use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id_user: i64,
    pub login: String,
    pub password: String,
    pub phone_number: String,
    pub user_name: String,
    pub user_surname: String,
    pub user_patronymic: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub login: String,
    pub password: String,
    pub phone_number: String,
    pub user_name: String,
    pub user_surname: String,
    pub user_patronymic: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub login: Option<String>,
    pub phone_number: Option<String>,
    pub user_name: Option<String>,
    pub user_surname: Option<String>,
    pub user_patronymic: Option<String>,
}

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref LOGIN_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_!?-]+$").unwrap();
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+7[0-9]{10}$").unwrap();
    pub static ref NAME_REGEX: Regex = Regex::new(r"^[a-zA-Zа-яА-Я]+$").unwrap();
}
