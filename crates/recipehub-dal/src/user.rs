use argon2::{
    password_hash::{rand_core::OsRng, Result as HashResult, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use futures::StreamExt as _;
use garde::Validate;
use recipehub_types::{
    claim::{Role, UserClaim},
    general::ValidEmail,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::Result, ChosenDB, Error, Pool};

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn hash_password(password: &str) -> HashResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, password_hash: &str) -> HashResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let res = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    if let Err(e) = res {
        debug!("Invalid password, error {e}");
    }
    Ok(res.is_ok())
}

fn is_valid_role(role: &str, _ctx: &()) -> garde::Result {
    role.parse::<Role>()
        .map_err(garde::Error::new)
        .map(|_| ())
}

fn is_valid_username(name: &str, _ctx: &()) -> garde::Result {
    if name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        Ok(())
    } else {
        Err(garde::Error::new(
            "only letters, digits and _ - . are allowed",
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateUser {
    #[garde(length(min = 3, max = 60), custom(is_valid_username))]
    pub username: String,
    #[garde(dive)]
    pub email: ValidEmail,
    #[garde(length(min = 6, max = 255))]
    pub password: String,
    #[garde(inner(inner(custom(is_valid_role))))]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserInt {
    id: i64,
    username: String,
    email: String,
    roles: Option<String>,
    created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Option<Vec<String>>,
    pub created_at: time::PrimitiveDateTime,
}

impl From<UserInt> for User {
    fn from(value: UserInt) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            roles: value.roles.map(|s| {
                s.split(",")
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            }),
            created_at: value.created_at,
        }
    }
}

impl From<User> for UserClaim {
    fn from(user: User) -> Self {
        let roles = user
            .roles
            .unwrap_or_default()
            .iter()
            .filter_map(|r| match r.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!("Ignoring role of user {}: {e}", user.id);
                    None
                }
            })
            .collect();
        UserClaim {
            id: user.id,
            username: user.username,
            email: user.email,
            roles,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, roles, created_at";

pub type UserRepository = UserRepositoryImpl<Pool>;

pub struct UserRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> UserRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateUser) -> Result<User> {
        payload
            .validate()
            .map_err(|e| Error::InvalidValue(e.to_string()))?;
        let password = hash_password(&payload.password)?;
        let roles = payload.roles.map(|roles| roles.join(","));
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, roles) VALUES (?, ?, ?, ?)",
        )
        .bind(payload.username.trim())
        .bind(payload.email.as_ref())
        .bind(password)
        .bind(roles)
        .execute(&self.executor)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Created user {id}");
        self.get(id).await
    }

    pub async fn list(&self, limit: usize) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let users = sqlx::query_as::<_, UserInt>(&sql)
            .fetch(&self.executor)
            .take(limit)
            .filter_map(|r| async move { r.ok().map(User::from) })
            .collect::<Vec<_>>()
            .await;
        Ok(users)
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, UserInt>(&sql)
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("User {id}")))?;
        Ok(user.into())
    }

    /// Finds user by username or by email
    pub async fn find_by_login(&self, login: &str) -> Result<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ?");
        let user = sqlx::query_as::<_, UserInt>(&sql)
            .bind(login)
            .bind(login)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("User {login}")))?;
        Ok(user.into())
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?)")
                .bind(username.trim())
                .fetch_one(&self.executor)
                .await?;
        Ok(found)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
            .bind(email.trim())
            .fetch_one(&self.executor)
            .await?;
        Ok(found)
    }

    /// Authenticates by username or email
    pub async fn check_password(&self, login: &str, password: &str) -> Result<User> {
        let (id, hashed_password): (i64, String) =
            sqlx::query_as("SELECT id, password FROM users WHERE username = ? OR email = ?")
                .bind(login.trim())
                .bind(login.trim())
                .fetch_one(&self.executor)
                .await
                .map_err(|e| {
                    debug!("User check error: {e}");
                    Error::InvalidCredentials
                })?;
        if verify_password(password, &hashed_password).unwrap_or(false) {
            return self.get(id).await;
        }
        Err(Error::InvalidCredentials)
    }

    pub async fn change_password(&self, login: &str, new_password: &str) -> Result<()> {
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::InvalidValue(format!(
                "password must have at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let password = hash_password(new_password)?;
        let result = sqlx::query("UPDATE users SET password = ? WHERE username = ? OR email = ?")
            .bind(password)
            .bind(login)
            .bind(login)
            .execute(&self.executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("User {login}")));
        }
        Ok(())
    }

    pub async fn set_roles(&self, login: &str, roles: &[Role]) -> Result<User> {
        let roles = (!roles.is_empty()).then(|| {
            roles
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(",")
        });
        let id: i64 = sqlx::query_scalar(
            "UPDATE users SET roles = ? WHERE username = ? OR email = ? RETURNING id",
        )
        .bind(roles)
        .bind(login)
        .bind(login)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound(format!("User {login}")))?;
        self.get(id).await
    }
}
