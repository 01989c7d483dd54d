use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::repository::{AccessFilter, BuildingAccessRepository};
use crate::error::ApiError;
use crate::model::{AccessRecord, AccessUser, BuildingAccess};
use crate::validate::{not_blank, Validatable};

#[derive(ToSchema, Serialize, Debug, Clone, PartialEq)]
pub struct BuildingAccessResponse {
    pub id: String,
    pub building_id: String,
    pub user_id: String,
    pub check_in: NaiveDateTime,
    /// `null` while the session is open
    pub check_out: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub user: Option<AccessUser>,
}

impl From<AccessRecord> for BuildingAccessResponse {
    fn from(AccessRecord { access, user }: AccessRecord) -> Self {
        Self {
            id: access.id,
            building_id: access.building_id,
            user_id: access.user_id,
            check_in: access.check_in,
            check_out: access.check_out,
            description: access.description,
            created_at: access.created_at,
            updated_at: access.updated_at,
            user,
        }
    }
}

#[derive(ToSchema, Deserialize, Validate, Debug, Default, Clone)]
#[serde(default)]
pub struct BuildingAccessRequest {
    #[validate(
        custom(function = "not_blank"),
        length(equal = 36, message = "the length must be exactly 36")
    )]
    pub building_id: String,
    #[validate(
        custom(function = "not_blank"),
        length(equal = 36, message = "the length must be exactly 36")
    )]
    pub user_id: String,
    #[validate(required(message = "cannot be blank"))]
    #[serde(deserialize_with = "utc_timestamp")]
    pub check_in: Option<NaiveDateTime>,
    #[serde(deserialize_with = "utc_timestamp")]
    pub check_out: Option<NaiveDateTime>,
    #[validate(length(max = 150, message = "the length must be no more than 150"))]
    pub description: Option<String>,
}

/// Accepts RFC 3339 timestamps with any offset as well as bare local times,
/// which are taken as UTC.
fn utc_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.naive_utc())
        .or_else(|_| raw.parse::<NaiveDateTime>())
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[derive(Clone)]
pub struct BuildingAccessService<R> {
    repo: R,
}

impl<R: BuildingAccessRepository> BuildingAccessService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get(
        &self,
        conn: &mut R::Conn,
        id: &str,
    ) -> Result<BuildingAccessResponse, ApiError> {
        Ok(self.repo.get(conn, id).await?.into())
    }

    /// Size of the whole table. Filters given to `query` are not applied.
    pub async fn count(&self, conn: &mut R::Conn) -> Result<i64, ApiError> {
        Ok(self.repo.count(conn).await?)
    }

    pub async fn query(
        &self,
        conn: &mut R::Conn,
        offset: i64,
        limit: i64,
        term: &str,
        filters: &Map<String, Value>,
    ) -> Result<Vec<BuildingAccessResponse>, ApiError> {
        let filter = AccessFilter::from_params(term, filters);
        let items = self.repo.query(conn, offset, limit, &filter).await?;
        Ok(items
            .into_iter()
            .map(BuildingAccessResponse::from)
            .collect())
    }

    pub async fn create(
        &self,
        conn: &mut R::Conn,
        req: BuildingAccessRequest,
    ) -> Result<BuildingAccessResponse, ApiError> {
        req.validate_fields()?;
        // `required` has rejected a missing check-in already
        let check_in = req.check_in.ok_or(ApiError::Internal)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        self.repo
            .create(
                conn,
                &BuildingAccess {
                    id: id.clone(),
                    building_id: req.building_id,
                    user_id: req.user_id,
                    check_in,
                    check_out: req.check_out,
                    description: req.description,
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
        req: BuildingAccessRequest,
    ) -> Result<BuildingAccessResponse, ApiError> {
        req.validate_fields()?;
        let check_in = req.check_in.ok_or(ApiError::Internal)?;
        let AccessRecord { mut access, .. } = self.repo.get(conn, id).await?;

        access.building_id = req.building_id;
        access.user_id = req.user_id;
        access.check_in = check_in;
        access.check_out = req.check_out;
        access.description = req.description;
        access.updated_at = Some(Utc::now().naive_utc());

        self.repo.update(conn, &access).await?;
        self.get(conn, id).await
    }

    pub async fn delete(
        &self,
        conn: &mut R::Conn,
        id: &str,
    ) -> Result<BuildingAccessResponse, ApiError> {
        let access = self.get(conn, id).await?;
        self.repo.delete(conn, id).await?;
        Ok(access)
    }
}
