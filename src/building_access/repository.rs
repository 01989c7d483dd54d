use async_trait::async_trait;
use diesel::{
    BoolExpressionMethods, ExpressionMethods, JoinOnDsl, NullableExpressionMethods,
    OptionalExtension, QueryDsl, SelectableHelper,
};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::model::{AccessRecord, AccessUser, BuildingAccess};
use crate::schema::{building_access, roles, users};

/// Query term selecting the open sessions of one building.
pub const OPEN_IN_BUILDING: &str = "by-building-and-not-check-out";

/// Row selection applied by [`BuildingAccessRepository::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessFilter {
    All,
    /// Rows of the building with no check-out. `None` matches nothing.
    OpenInBuilding(Option<String>),
}

impl AccessFilter {
    /// Unknown terms fall back to the unfiltered listing.
    pub fn from_params(term: &str, filters: &Map<String, Value>) -> Self {
        match term {
            OPEN_IN_BUILDING => AccessFilter::OpenInBuilding(
                filters
                    .get("building_id")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            ),
            _ => AccessFilter::All,
        }
    }
}

/// Storage of check-in/check-out records. Reads attach a projection of the
/// user the record belongs to.
#[async_trait]
pub trait BuildingAccessRepository: Send + Sync {
    type Conn: Send;

    async fn get(&self, conn: &mut Self::Conn, id: &str) -> Result<AccessRecord, StoreError>;
    /// Size of the whole table, regardless of any query filter.
    async fn count(&self, conn: &mut Self::Conn) -> Result<i64, StoreError>;
    async fn query(
        &self,
        conn: &mut Self::Conn,
        offset: i64,
        limit: i64,
        filter: &AccessFilter,
    ) -> Result<Vec<AccessRecord>, StoreError>;
    async fn create(
        &self,
        conn: &mut Self::Conn,
        access: &BuildingAccess,
    ) -> Result<(), StoreError>;
    async fn update(
        &self,
        conn: &mut Self::Conn,
        access: &BuildingAccess,
    ) -> Result<(), StoreError>;
    async fn delete(&self, conn: &mut Self::Conn, id: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Default)]
pub struct PgBuildingAccessRepository;

async fn access_user(
    conn: &mut AsyncPgConnection,
    user_id: &str,
) -> Result<Option<AccessUser>, StoreError> {
    Ok(users::table
        .left_join(roles::table.on(roles::id.eq(users::role_id)))
        .filter(users::id.eq(user_id))
        .select((
            users::id,
            users::username,
            users::role_id,
            roles::name.nullable(),
            users::first_name,
            users::last_name,
            users::created_at,
            users::updated_at,
            users::is_active,
        ))
        .first::<AccessUser>(conn)
        .await
        .optional()?)
}

async fn with_user(
    conn: &mut AsyncPgConnection,
    access: BuildingAccess,
) -> Result<AccessRecord, StoreError> {
    let user = access_user(conn, &access.user_id).await?;
    Ok(AccessRecord { access, user })
}

#[async_trait]
impl BuildingAccessRepository for PgBuildingAccessRepository {
    type Conn = AsyncPgConnection;

    async fn get(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<AccessRecord, StoreError> {
        let access = building_access::table
            .find(id)
            .select(BuildingAccess::as_select())
            .first::<BuildingAccess>(conn)
            .await?;
        with_user(conn, access).await
    }

    async fn count(&self, conn: &mut AsyncPgConnection) -> Result<i64, StoreError> {
        Ok(building_access::table
            .count()
            .get_result::<i64>(conn)
            .await?)
    }

    async fn query(
        &self,
        conn: &mut AsyncPgConnection,
        offset: i64,
        limit: i64,
        filter: &AccessFilter,
    ) -> Result<Vec<AccessRecord>, StoreError> {
        let mut query = building_access::table.into_boxed();
        match filter {
            AccessFilter::All => {}
            AccessFilter::OpenInBuilding(None) => return Ok(Vec::new()),
            AccessFilter::OpenInBuilding(Some(building_id)) => {
                query = query.filter(
                    building_access::building_id
                        .eq(building_id.as_str())
                        .and(building_access::check_out.is_null()),
                );
            }
        }

        let rows = query
            .order(building_access::id.asc())
            .offset(offset)
            .limit(limit)
            .select(BuildingAccess::as_select())
            .load::<BuildingAccess>(conn)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for access in rows {
            records.push(with_user(conn, access).await?);
        }
        Ok(records)
    }

    async fn create(
        &self,
        conn: &mut AsyncPgConnection,
        access: &BuildingAccess,
    ) -> Result<(), StoreError> {
        diesel::insert_into(building_access::table)
            .values(access)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        conn: &mut AsyncPgConnection,
        access: &BuildingAccess,
    ) -> Result<(), StoreError> {
        let updated = diesel::update(building_access::table.find(access.id.as_str()))
            .set(access)
            .execute(conn)
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<(), StoreError> {
        building_access::table
            .find(id)
            .select(building_access::id)
            .first::<String>(conn)
            .await?;
        diesel::delete(building_access::table.find(id))
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn open_in_building_reads_building_id() {
        let filter = AccessFilter::from_params(OPEN_IN_BUILDING, &filters(json!({"building_id": "b-1"})));
        assert_eq!(filter, AccessFilter::OpenInBuilding(Some("b-1".into())));
    }

    #[test]
    fn non_string_building_id_matches_nothing() {
        let filter = AccessFilter::from_params(OPEN_IN_BUILDING, &filters(json!({"building_id": 7})));
        assert_eq!(filter, AccessFilter::OpenInBuilding(None));
    }

    #[test]
    fn unknown_term_lists_everything() {
        let filter = AccessFilter::from_params("by-user", &filters(json!({"building_id": "b-1"})));
        assert_eq!(filter, AccessFilter::All);
        assert_eq!(AccessFilter::from_params("", &Map::new()), AccessFilter::All);
    }
}
