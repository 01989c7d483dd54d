use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::repository::CareerRepository;
use crate::error::ApiError;
use crate::model::{Career, CareerRecord, Group};
use crate::validate::{not_blank, Validatable};

#[derive(ToSchema, Serialize, Debug, Clone, PartialEq)]
pub struct CareerResponse {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub groups: Vec<Group>,
}

impl From<CareerRecord> for CareerResponse {
    fn from(CareerRecord { career, groups }: CareerRecord) -> Self {
        Self {
            id: career.id,
            name: career.name,
            is_active: career.is_active,
            groups,
        }
    }
}

/// Body of both create and update. `is_active` is ignored on create.
#[derive(ToSchema, Deserialize, Validate, Debug, Default, Clone)]
#[serde(default)]
pub struct CareerRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 128, message = "the length must be no more than 128")
    )]
    pub name: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct CareerService<R> {
    repo: R,
}

impl<R: CareerRepository> CareerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get(&self, conn: &mut R::Conn, id: &str) -> Result<CareerResponse, ApiError> {
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
    ) -> Result<Vec<CareerResponse>, ApiError> {
        let items = self.repo.query(conn, offset, limit).await?;
        Ok(items.into_iter().map(CareerResponse::from).collect())
    }

    pub async fn create(
        &self,
        conn: &mut R::Conn,
        req: CareerRequest,
    ) -> Result<CareerResponse, ApiError> {
        req.validate_fields()?;
        let id = Uuid::new_v4().to_string();
        self.repo
            .create(
                conn,
                &Career {
                    id: id.clone(),
                    name: req.name,
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
        req: CareerRequest,
    ) -> Result<CareerResponse, ApiError> {
        req.validate_fields()?;
        let CareerRecord { mut career, .. } = self.repo.get(conn, id).await?;

        career.name = req.name;
        career.is_active = req.is_active;

        self.repo.update(conn, &career).await?;
        self.get(conn, id).await
    }
}
