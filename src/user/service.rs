use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::repository::UserRepository;
use crate::error::ApiError;
use crate::model::{User, UserRecord};
use crate::validate::{not_blank, Validatable};

/// User as exposed over the API. Carries no password.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role_id: String,
    pub role_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub registration_number: Option<String>,
    pub career_id: Option<String>,
    pub career_name: Option<String>,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        let UserRecord {
            user,
            role_name,
            career_name,
            group_name,
        } = record;
        Self {
            id: user.id,
            username: user.username,
            role_id: user.role_id,
            role_name,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            registration_number: user.registration_number,
            career_id: user.career_id,
            career_name,
            group_id: user.group_id,
            group_name,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(ToSchema, Deserialize, Validate, Debug, Default, Clone)]
#[serde(default)]
pub struct CreateUserRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub username: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub password: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 36, message = "the length must be no more than 36")
    )]
    pub role_id: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub last_name: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(min = 3, max = 50, message = "the length must be between 3 and 50")
    )]
    pub email: String,
    #[validate(length(max = 10, message = "the length must be no more than 10"))]
    pub registration_number: Option<String>,
    pub career_id: Option<String>,
    pub group_id: Option<String>,
}

/// An empty or absent `password` keeps the stored hash.
#[derive(ToSchema, Deserialize, Validate, Debug, Default, Clone)]
#[serde(default)]
pub struct UpdateUserRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub username: String,
    #[validate(length(max = 50, message = "the length must be no more than 50"))]
    pub password: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 36, message = "the length must be no more than 36")
    )]
    pub role_id: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub last_name: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(min = 3, max = 50, message = "the length must be between 3 and 50")
    )]
    pub email: String,
    #[validate(length(max = 10, message = "the length must be no more than 10"))]
    pub registration_number: Option<String>,
    pub career_id: Option<String>,
    pub group_id: Option<String>,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct UserService<R> {
    repo: R,
    bcrypt_cost: u32,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    pub async fn get(&self, conn: &mut R::Conn, id: &str) -> Result<UserResponse, ApiError> {
        Ok(self.repo.get(conn, id).await?.into())
    }

    pub async fn count(&self, conn: &mut R::Conn) -> Result<i64, ApiError> {
        Ok(self.repo.count(conn).await?)
    }

    pub async fn query(
        &self,
        conn: &mut R::Conn,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserResponse>, ApiError> {
        let records = self.repo.query(conn, offset, limit).await?;
        Ok(records.into_iter().map(UserResponse::from).collect())
    }

    pub async fn create(
        &self,
        conn: &mut R::Conn,
        req: CreateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        req.validate_fields()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        let password = bcrypt::hash(&req.password, self.bcrypt_cost)?;
        self.repo
            .create(
                conn,
                &User {
                    id: id.clone(),
                    username: req.username,
                    password,
                    role_id: req.role_id,
                    first_name: req.first_name,
                    last_name: req.last_name,
                    email: req.email,
                    registration_number: req.registration_number,
                    career_id: req.career_id,
                    group_id: req.group_id,
                    is_active: true,
                    created_at: now,
                    updated_at: Some(now),
                },
            )
            .await?;
        self.get(conn, &id).await
    }

    pub async fn update(
        &self,
        conn: &mut R::Conn,
        id: &str,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        req.validate_fields()?;
        let mut user = self.repo.get(conn, id).await?.user;

        if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
            user.password = bcrypt::hash(password, self.bcrypt_cost)?;
        }
        user.username = req.username;
        user.role_id = req.role_id;
        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user.email = req.email;
        user.registration_number = req.registration_number;
        user.career_id = req.career_id;
        user.group_id = req.group_id;
        user.is_active = req.is_active;
        user.updated_at = Some(Utc::now().naive_utc());

        self.repo.update(conn, &user).await?;
        self.get(conn, id).await
    }

    pub async fn delete(&self, conn: &mut R::Conn, id: &str) -> Result<UserResponse, ApiError> {
        let user = self.get(conn, id).await?;
        self.repo.delete(conn, id).await?;
        Ok(user)
    }

    /// Checks a username/password pair. Unknown users, wrong passwords and
    /// inactive accounts all answer the same way.
    pub async fn authenticate(
        &self,
        conn: &mut R::Conn,
        username: &str,
        password: &str,
    ) -> Result<UserResponse, ApiError> {
        let Some(user) = self.repo.find_by_username(conn, username).await? else {
            // same bcrypt work as a real verify, so timing does not reveal the miss
            let _ = bcrypt::hash(password, self.bcrypt_cost);
            tracing::warn!("login attempt for unknown user {}", username);
            return Err(ApiError::Unauthorized("Wrong credentials"));
        };
        let matches = bcrypt::verify(password, &user.password).unwrap_or_else(|e| {
            tracing::error!("stored hash of user {} is unreadable: {}", username, e);
            false
        });
        if !matches {
            tracing::warn!("wrong password for user {}", username);
            return Err(ApiError::Unauthorized("Wrong credentials"));
        }
        if !user.is_active {
            tracing::warn!("login attempt for inactive user {}", username);
            return Err(ApiError::Unauthorized("Wrong credentials"));
        }
        self.get(conn, &user.id).await
    }
}
