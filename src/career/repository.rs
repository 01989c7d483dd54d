use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::StoreError;
use crate::model::{Career, CareerRecord, Group};
use crate::schema::{careers, groups};

/// Storage of careers. Reads load the groups of each career.
///
/// Careers cannot be deleted in this revision.
#[async_trait]
pub trait CareerRepository: Send + Sync {
    type Conn: Send;

    async fn get(&self, conn: &mut Self::Conn, id: &str) -> Result<CareerRecord, StoreError>;
    async fn count(&self, conn: &mut Self::Conn) -> Result<i64, StoreError>;
    async fn query(
        &self,
        conn: &mut Self::Conn,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<CareerRecord>, StoreError>;
    async fn create(&self, conn: &mut Self::Conn, career: &Career) -> Result<(), StoreError>;
    async fn update(&self, conn: &mut Self::Conn, career: &Career) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Default)]
pub struct PgCareerRepository;

async fn with_groups(
    conn: &mut AsyncPgConnection,
    career: Career,
) -> Result<CareerRecord, StoreError> {
    let groups = groups::table
        .filter(groups::career_id.eq(career.id.as_str()))
        .order(groups::id.asc())
        .select(Group::as_select())
        .load::<Group>(conn)
        .await?;
    Ok(CareerRecord { career, groups })
}

#[async_trait]
impl CareerRepository for PgCareerRepository {
    type Conn = AsyncPgConnection;

    async fn get(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<CareerRecord, StoreError> {
        let career = careers::table
            .find(id)
            .select(Career::as_select())
            .first::<Career>(conn)
            .await?;
        with_groups(conn, career).await
    }

    async fn count(&self, conn: &mut AsyncPgConnection) -> Result<i64, StoreError> {
        Ok(careers::table.count().get_result::<i64>(conn).await?)
    }

    async fn query(
        &self,
        conn: &mut AsyncPgConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<CareerRecord>, StoreError> {
        let rows = careers::table
            .order(careers::id.asc())
            .offset(offset)
            .limit(limit)
            .select(Career::as_select())
            .load::<Career>(conn)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for career in rows {
            records.push(with_groups(conn, career).await?);
        }
        Ok(records)
    }

    async fn create(&self, conn: &mut AsyncPgConnection, career: &Career) -> Result<(), StoreError> {
        diesel::insert_into(careers::table)
            .values(career)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn update(&self, conn: &mut AsyncPgConnection, career: &Career) -> Result<(), StoreError> {
        let updated = diesel::update(careers::table.find(career.id.as_str()))
            .set(career)
            .execute(conn)
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
