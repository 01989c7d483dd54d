use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::StoreError;
use crate::model::Group;
use crate::schema::groups;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    type Conn: Send;

    async fn get(&self, conn: &mut Self::Conn, id: &str) -> Result<Group, StoreError>;
    async fn count(&self, conn: &mut Self::Conn) -> Result<i64, StoreError>;
    async fn query(
        &self,
        conn: &mut Self::Conn,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Group>, StoreError>;
    async fn create(&self, conn: &mut Self::Conn, group: &Group) -> Result<(), StoreError>;
    async fn update(&self, conn: &mut Self::Conn, group: &Group) -> Result<(), StoreError>;
    async fn delete(&self, conn: &mut Self::Conn, id: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Default)]
pub struct PgGroupRepository;

#[async_trait]
impl GroupRepository for PgGroupRepository {
    type Conn = AsyncPgConnection;

    async fn get(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<Group, StoreError> {
        Ok(groups::table
            .find(id)
            .select(Group::as_select())
            .first::<Group>(conn)
            .await?)
    }

    async fn count(&self, conn: &mut AsyncPgConnection) -> Result<i64, StoreError> {
        Ok(groups::table.count().get_result::<i64>(conn).await?)
    }

    async fn query(
        &self,
        conn: &mut AsyncPgConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Group>, StoreError> {
        Ok(groups::table
            .order(groups::id.asc())
            .offset(offset)
            .limit(limit)
            .select(Group::as_select())
            .load::<Group>(conn)
            .await?)
    }

    async fn create(&self, conn: &mut AsyncPgConnection, group: &Group) -> Result<(), StoreError> {
        diesel::insert_into(groups::table)
            .values(group)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn update(&self, conn: &mut AsyncPgConnection, group: &Group) -> Result<(), StoreError> {
        let updated = diesel::update(groups::table.find(group.id.as_str()))
            .set(group)
            .execute(conn)
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<(), StoreError> {
        self.get(conn, id).await?;
        diesel::delete(groups::table.find(id)).execute(conn).await?;
        Ok(())
    }
}
