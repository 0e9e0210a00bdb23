use crate::db::DatabasePool;
use crate::error::{AppError, AppResult};
use crate::models::user::{LOGIN_REGEX, NAME_REGEX, PHONE_REGEX};
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use sha2::{Digest, Sha256};
use sqlx::Row;

pub struct UserService {
    db: DatabasePool,
}

impl UserService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    fn hash_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> AppResult<User> {
        // Rules run in a fixed order; the first violated rule's message is returned.
        if req.login.trim().is_empty()
            || req.password.trim().is_empty()
            || req.phone_number.trim().is_empty()
            || req.user_name.trim().is_empty()
            || req.user_surname.trim().is_empty()
        {
            return Err(AppError::ValidationError(
                "Fill in all required fields!".to_string(),
            ));
        }

        let login_len = req.login.chars().count();
        if !(3..=20).contains(&login_len) {
            return Err(AppError::ValidationError(
                "Login must be between 3 and 20 characters".to_string(),
            ));
        }

        if !LOGIN_REGEX.is_match(&req.login) {
            return Err(AppError::ValidationError(
                "Login may only contain Latin letters, digits, and the characters -, _, !, ?"
                    .to_string(),
            ));
        }

        let password_len = req.password.chars().count();
        if !(5..=20).contains(&password_len) {
            return Err(AppError::ValidationError(
                "Password must be between 5 and 20 characters".to_string(),
            ));
        }

        if !PHONE_REGEX.is_match(&req.phone_number) {
            return Err(AppError::ValidationError(
                "Phone number must be in the format +79991234567".to_string(),
            ));
        }

        if req.user_name.chars().count() > 45 || req.user_surname.chars().count() > 45 {
            return Err(AppError::ValidationError(
                "First name or last name cannot exceed 45 characters".to_string(),
            ));
        }

        if !NAME_REGEX.is_match(&req.user_name) || !NAME_REGEX.is_match(&req.user_surname) {
            return Err(AppError::ValidationError(
                "First name and last name may only contain letters".to_string(),
            ));
        }

        // Patronymic is optional; a blank one is stored as the empty string.
        let patronymic = if req.user_patronymic.trim().is_empty() {
            String::new()
        } else {
            if req.user_patronymic.chars().count() > 45 {
                return Err(AppError::ValidationError(
                    "Patronymic cannot exceed 45 characters".to_string(),
                ));
            }
            if !NAME_REGEX.is_match(&req.user_patronymic) {
                return Err(AppError::ValidationError(
                    "Patronymic may only contain letters".to_string(),
                ));
            }
            req.user_patronymic.clone()
        };

        if self.find_by_login(&req.login).await?.is_some() {
            return Err(AppError::ValidationError(
                "A user with this login is already registered".to_string(),
            ));
        }

        if self.find_by_phone(&req.phone_number).await?.is_some() {
            return Err(AppError::ValidationError(
                "A user with this phone number is already registered".to_string(),
            ));
        }

        let password_hash = Self::hash_password(&req.password);

        let id = match &self.db {
            DatabasePool::Postgres(pool) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO users (user_login, password, phone_number, user_name, user_surname, user_patronymic)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id_user
                    "#,
                )
                .bind(&req.login)
                .bind(&password_hash)
                .bind(&req.phone_number)
                .bind(&req.user_name)
                .bind(&req.user_surname)
                .bind(&patronymic)
                .fetch_one(pool)
                .await?;

                result.get::<i64, _>("id_user")
            }
            DatabasePool::Sqlite(pool) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO users (user_login, password, phone_number, user_name, user_surname, user_patronymic)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(&req.login)
                .bind(&password_hash)
                .bind(&req.phone_number)
                .bind(&req.user_name)
                .bind(&req.user_surname)
                .bind(&patronymic)
                .execute(pool)
                .await?;

                result.last_insert_rowid()
            }
        };

        self.get_user(id).await?.ok_or_else(|| {
            AppError::InternalServerError("Failed to load created user".to_string())
        })
    }

    pub async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_user, user_login, password, phone_number, user_name, user_surname, user_patronymic
                    FROM users
                    WHERE id_user = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_user_postgres(row)))
            }
            DatabasePool::Sqlite(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_user, user_login, password, phone_number, user_name, user_surname, user_patronymic
                    FROM users
                    WHERE id_user = ?1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_user(row)))
            }
        }
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let rows = sqlx::query(
                    r#"
                    SELECT id_user, user_login, password, phone_number, user_name, user_surname, user_patronymic
                    FROM users
                    ORDER BY id_user
                    "#,
                )
                .fetch_all(pool)
                .await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_user_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query(
                    r#"
                    SELECT id_user, user_login, password, phone_number, user_name, user_surname, user_patronymic
                    FROM users
                    ORDER BY id_user
                    "#,
                )
                .fetch_all(pool)
                .await?;

                Ok(rows.into_iter().map(|row| self.row_to_user(row)).collect())
            }
        }
    }

    pub async fn update_user(&self, id: i64, req: UpdateUserRequest) -> AppResult<User> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found", id)))?;

        let login = req.login.unwrap_or(existing.login);
        let phone_number = req.phone_number.unwrap_or(existing.phone_number);
        let user_name = req.user_name.unwrap_or(existing.user_name);
        let user_surname = req.user_surname.unwrap_or(existing.user_surname);
        // Patronymic is applied as given and may be cleared; the password is
        // never updated through this path.
        let user_patronymic = req.user_patronymic;

        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query(
                    r#"
                    UPDATE users SET
                        user_login = $2,
                        phone_number = $3,
                        user_name = $4,
                        user_surname = $5,
                        user_patronymic = $6
                    WHERE id_user = $1
                    "#,
                )
                .bind(id)
                .bind(&login)
                .bind(&phone_number)
                .bind(&user_name)
                .bind(&user_surname)
                .bind(&user_patronymic)
                .execute(pool)
                .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    UPDATE users SET
                        user_login = ?2,
                        phone_number = ?3,
                        user_name = ?4,
                        user_surname = ?5,
                        user_patronymic = ?6
                    WHERE id_user = ?1
                    "#,
                )
                .bind(id)
                .bind(&login)
                .bind(&phone_number)
                .bind(&user_name)
                .bind(&user_surname)
                .bind(&user_patronymic)
                .execute(pool)
                .await?;
            }
        }

        self.get_user(id).await?.ok_or_else(|| {
            AppError::InternalServerError("Failed to load updated user".to_string())
        })
    }

    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query("DELETE FROM users WHERE id_user = $1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query("DELETE FROM users WHERE id_user = ?1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
        }

        Ok(())
    }

    pub async fn authenticate_user(&self, login: &str, password: &str) -> AppResult<User> {
        // The same message covers an unknown login and a wrong password.
        let user = self
            .find_by_login(login)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid login or password".to_string()))?;

        if Self::hash_password(password) != user.password {
            return Err(AppError::Unauthorized(
                "Invalid login or password".to_string(),
            ));
        }

        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_user, user_login, password, phone_number, user_name, user_surname, user_patronymic
                    FROM users
                    WHERE user_login = $1
                    "#,
                )
                .bind(login)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_user_postgres(row)))
            }
            DatabasePool::Sqlite(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_user, user_login, password, phone_number, user_name, user_surname, user_patronymic
                    FROM users
                    WHERE user_login = ?1
                    "#,
                )
                .bind(login)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_user(row)))
            }
        }
    }

    async fn find_by_phone(&self, phone_number: &str) -> AppResult<Option<i64>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let row = sqlx::query("SELECT id_user FROM users WHERE phone_number = $1")
                    .bind(phone_number)
                    .fetch_optional(pool)
                    .await?;

                Ok(row.map(|row| row.get("id_user")))
            }
            DatabasePool::Sqlite(pool) => {
                let row = sqlx::query("SELECT id_user FROM users WHERE phone_number = ?1")
                    .bind(phone_number)
                    .fetch_optional(pool)
                    .await?;

                Ok(row.map(|row| row.get("id_user")))
            }
        }
    }

    fn row_to_user(&self, row: sqlx::sqlite::SqliteRow) -> User {
        User {
            id_user: row.get("id_user"),
            login: row.get("user_login"),
            password: row.get("password"),
            phone_number: row.get("phone_number"),
            user_name: row.get("user_name"),
            user_surname: row.get("user_surname"),
            user_patronymic: row.get("user_patronymic"),
        }
    }

    fn row_to_user_postgres(&self, row: sqlx::postgres::PgRow) -> User {
        User {
            id_user: row.get("id_user"),
            login: row.get("user_login"),
            password: row.get("password"),
            phone_number: row.get("phone_number"),
            user_name: row.get("user_name"),
            user_surname: row.get("user_surname"),
            user_patronymic: row.get("user_patronymic"),
        }
    }
}
