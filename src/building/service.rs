use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::repository::BuildingRepository;
use crate::error::ApiError;
use crate::model::{Building, BuildingRecord};
use crate::validate::{not_blank, Validatable};

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BuildingResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_limit: i32,
    /// Users currently checked in
    pub active_users: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

impl From<BuildingRecord> for BuildingResponse {
    fn from(BuildingRecord { building, active_users }: BuildingRecord) -> Self {
        Self {
            id: building.id,
            name: building.name,
            description: building.description,
            user_limit: building.user_limit,
            active_users,
            created_at: building.created_at,
            updated_at: building.updated_at,
            is_active: building.is_active,
        }
    }
}

/// Body of both create and update. `is_active` is ignored on create.
#[derive(ToSchema, Deserialize, Validate, Debug, Default, Clone)]
#[serde(default)]
pub struct BuildingRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "the length must be no more than 50")
    )]
    pub name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 150, message = "the length must be no more than 150")
    )]
    pub description: String,
    pub user_limit: i32,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct BuildingService<R> {
    repo: R,
}

impl<R: BuildingRepository> BuildingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get(&self, conn: &mut R::Conn, id: &str) -> Result<BuildingResponse, ApiError> {
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
    ) -> Result<Vec<BuildingResponse>, ApiError> {
        let items = self.repo.query(conn, offset, limit).await?;
        Ok(items.into_iter().map(BuildingResponse::from).collect())
    }

    pub async fn create(
        &self,
        conn: &mut R::Conn,
        req: BuildingRequest,
    ) -> Result<BuildingResponse, ApiError> {
        req.validate_fields()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        self.repo
            .create(
                conn,
                &Building {
                    id: id.clone(),
                    name: req.name.trim().to_string(),
                    description: Some(req.description),
                    user_limit: req.user_limit,
                    created_at: now,
                    updated_at: Some(now),
                    is_active: true,
                },
            )
            .await?;
        self.get(conn, &id).await
    }

    pub async fn update(
        &self,
        conn: &mut R::Conn,
        id: &str,
        req: BuildingRequest,
    ) -> Result<BuildingResponse, ApiError> {
        req.validate_fields()?;
        let BuildingRecord { mut building, .. } = self.repo.get(conn, id).await?;

        building.name = req.name.trim().to_string();
        building.description = Some(req.description);
        building.user_limit = req.user_limit;
        building.is_active = req.is_active;
        building.updated_at = Some(Utc::now().naive_utc());

        self.repo.update(conn, &building).await?;
        self.get(conn, id).await
    }

    /// Removes the building and returns it as it was before deletion.
    pub async fn delete(&self, conn: &mut R::Conn, id: &str) -> Result<BuildingResponse, ApiError> {
        let building = self.get(conn, id).await?;
        self.repo.delete(conn, id).await?;
        Ok(building)
    }
}
