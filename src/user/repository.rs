use async_trait::async_trait;
use diesel::{
    ExpressionMethods, JoinOnDsl, NullableExpressionMethods, OptionalExtension, QueryDsl,
    SelectableHelper,
};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::StoreError;
use crate::model::{User, UserRecord};
use crate::schema::{careers, groups, roles, users};

#[async_trait]
pub trait UserRepository: Send + Sync {
    type Conn: Send;

    async fn get(&self, conn: &mut Self::Conn, id: &str) -> Result<UserRecord, StoreError>;
    async fn count(&self, conn: &mut Self::Conn) -> Result<i64, StoreError>;
    async fn query(
        &self,
        conn: &mut Self::Conn,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserRecord>, StoreError>;
    async fn create(&self, conn: &mut Self::Conn, user: &User) -> Result<(), StoreError>;
    async fn update(&self, conn: &mut Self::Conn, user: &User) -> Result<(), StoreError>;
    async fn delete(&self, conn: &mut Self::Conn, id: &str) -> Result<(), StoreError>;
    async fn find_by_username(
        &self,
        conn: &mut Self::Conn,
        username: &str,
    ) -> Result<Option<User>, StoreError>;
}

#[derive(Clone, Copy, Default)]
pub struct PgUserRepository;

type Row = (User, Option<String>, Option<String>, Option<String>);

fn into_record((user, role_name, career_name, group_name): Row) -> UserRecord {
    UserRecord {
        user,
        role_name,
        career_name,
        group_name,
    }
}

macro_rules! with_names {
    () => {
        users::table
            .left_join(roles::table.on(roles::id.eq(users::role_id)))
            .left_join(careers::table.on(users::career_id.eq(careers::id.nullable())))
            .left_join(groups::table.on(users::group_id.eq(groups::id.nullable())))
            .select((
                User::as_select(),
                roles::name.nullable(),
                careers::name.nullable(),
                groups::name.nullable(),
            ))
    };
}

#[async_trait]
impl UserRepository for PgUserRepository {
    type Conn = AsyncPgConnection;

    async fn get(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<UserRecord, StoreError> {
        let row = with_names!()
            .filter(users::id.eq(id))
            .first::<Row>(conn)
            .await?;
        Ok(into_record(row))
    }

    async fn count(&self, conn: &mut AsyncPgConnection) -> Result<i64, StoreError> {
        Ok(users::table.count().get_result::<i64>(conn).await?)
    }

    async fn query(
        &self,
        conn: &mut AsyncPgConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserRecord>, StoreError> {
        let rows = with_names!()
            .order(users::id.asc())
            .offset(offset)
            .limit(limit)
            .load::<Row>(conn)
            .await?;
        Ok(rows.into_iter().map(into_record).collect())
    }

    async fn create(&self, conn: &mut AsyncPgConnection, user: &User) -> Result<(), StoreError> {
        diesel::insert_into(users::table)
            .values(user)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn update(&self, conn: &mut AsyncPgConnection, user: &User) -> Result<(), StoreError> {
        let updated = diesel::update(users::table.find(user.id.as_str()))
            .set(user)
            .execute(conn)
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, conn: &mut AsyncPgConnection, id: &str) -> Result<(), StoreError> {
        users::table
            .find(id)
            .select(users::id)
            .first::<String>(conn)
            .await?;
        diesel::delete(users::table.find(id)).execute(conn).await?;
        Ok(())
    }

    async fn find_by_username(
        &self,
        conn: &mut AsyncPgConnection,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()?)
    }
}
