use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::StoreError;
use crate::model::{Building, BuildingRecord};
use crate::schema::{building_access, buildings};

/// Storage of buildings. Every read reports the number of open access
/// sessions alongside the row.
#[async_trait]
pub trait BuildingRepository: Send + Sync {
    type Conn: Send;

    async fn get(&self, conn: &mut Self::Conn, id: &str) -> Result<BuildingRecord, StoreError>;
    async fn count(&self, conn: &mut Self::Conn) -> Result<i64, StoreError>;
    /// Buildings ordered by id, windowed by `offset` and `limit`.
    async fn query(
        &self,
        conn: &mut Self::Conn,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BuildingRecord>, StoreError>;
    async fn create(&self, conn: &mut Self::Conn, building: &Building) -> Result<(), StoreError>;
    async fn update(&self, conn: &mut Self::Conn, building: &Building) -> Result<(), StoreError>;
    async fn delete(&self, conn: &mut Self::Conn, id: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Default)]
pub struct PgBuildingRepository;

async fn active_users(conn: &mut AsyncPgConnection, building_id: &str) -> Result<i64, StoreError> {
    Ok(building_access::table
        .filter(building_access::building_id.eq(building_id))
        .filter(building_access::check_out.is_null())
        .count()
        .get_result::<i64>(conn)
        .await?)
}

#[async_trait]
impl BuildingRepository for PgBuildingRepository {
    type Conn = AsyncPgConnection;

    async fn get(
        &self,
        conn: &mut AsyncPgConnection,
        id: &str,
    ) -> Result<BuildingRecord, StoreError> {
        let building = buildings::table
            .find(id)
            .select(Building::as_select())
            .first::<Building>(conn)
            .await?;
        let active_users = active_users(conn, &building.id).await?;
        Ok(BuildingRecord {
            building,
            active_users,
        })
    }

    async fn count(&self, conn: &mut AsyncPgConnection) -> Result<i64, StoreError> {
        Ok(buildings::table.count().get_result::<i64>(conn).await?)
    }

    async fn query(
        &self,
        conn: &mut AsyncPgConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BuildingRecord>, StoreError> {
        let rows = buildings::table
            .order(buildings::id.asc())
            .offset(offset)
            .limit(limit)
            .select(Building::as_select())
            .load::<Building>(conn)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for building in rows {
            let active_users = active_users(conn, &building.id).await?;
            records.push(BuildingRecord {
                building,
                active_users,
            });
        }
        Ok(records)
    }

    async fn create(
        &self,
        conn: &mut AsyncPgConnection,
        building: &Building,
    ) -> Result<(), StoreError> {
        diesel::insert_into(buildings::table)
            .values(building)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        conn: &mut AsyncPgConnection,
        building: &Building,
    ) -> Result<(), StoreError> {
        let updated = diesel::update(buildings::table.find(building.id.as_str()))
            .set(building)
            .execute(conn)
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<(), StoreError> {
        buildings::table
            .find(id)
            .select(buildings::id)
            .first::<String>(conn)
            .await?;
        diesel::delete(buildings::table.find(id))
            .execute(conn)
            .await?;
        Ok(())
    }
}
