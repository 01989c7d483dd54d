use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::StoreError;
use crate::model::Role;
use crate::schema::roles;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    type Conn: Send;

    async fn get(&self, conn: &mut Self::Conn, id: &str) -> Result<Role, StoreError>;
    async fn count(&self, conn: &mut Self::Conn) -> Result<i64, StoreError>;
    async fn query(
        &self,
        conn: &mut Self::Conn,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Role>, StoreError>;
    async fn create(&self, conn: &mut Self::Conn, role: &Role) -> Result<(), StoreError>;
    async fn update(&self, conn: &mut Self::Conn, role: &Role) -> Result<(), StoreError>;
    async fn delete(&self, conn: &mut Self::Conn, id: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Default)]
pub struct PgRoleRepository;

#[async_trait]
impl RoleRepository for PgRoleRepository {
    type Conn = AsyncPgConnection;

    async fn get(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<Role, StoreError> {
        Ok(roles::table
            .find(id)
            .select(Role::as_select())
            .first::<Role>(conn)
            .await?)
    }

    async fn count(&self, conn: &mut AsyncPgConnection) -> Result<i64, StoreError> {
        Ok(roles::table.count().get_result::<i64>(conn).await?)
    }

    async fn query(
        &self,
        conn: &mut AsyncPgConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Role>, StoreError> {
        Ok(roles::table
            .order(roles::id.asc())
            .offset(offset)
            .limit(limit)
            .select(Role::as_select())
            .load::<Role>(conn)
            .await?)
    }

    async fn create(&self, conn: &mut AsyncPgConnection, role: &Role) -> Result<(), StoreError> {
        diesel::insert_into(roles::table)
            .values(role)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn update(&self, conn: &mut AsyncPgConnection, role: &Role) -> Result<(), StoreError> {
        let updated = diesel::update(roles::table.find(role.id.as_str()))
            .set(role)
            .execute(conn)
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<(), StoreError> {
        self.get(conn, id).await?;
        diesel::delete(roles::table.find(id)).execute(conn).await?;
        Ok(())
    }
}
