use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::repository::GroupRepository;
use crate::error::ApiError;
use crate::model::Group;
use crate::validate::{not_blank, Validatable};

/// Groups carry no derived fields, so the stored row is the response.
pub type GroupResponse = Group;

/// Body of both create and update. `is_active` is ignored on create.
#[derive(ToSchema, Deserialize, Validate, Debug, Default, Clone)]
#[serde(default)]
pub struct GroupRequest {
    #[validate(
        custom(function = "not_blank"),
        length(equal = 36, message = "the length must be exactly 36")
    )]
    pub career_id: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 128, message = "the length must be no more than 128")
    )]
    pub name: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct GroupService<R> {
    repo: R,
}

impl<R: GroupRepository> GroupService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get(&self, conn: &mut R::Conn, id: &str) -> Result<GroupResponse, ApiError> {
        Ok(self.repo.get(conn, id).await?)
    }

    pub async fn count(&self, conn: &mut R::Conn) -> Result<i64, ApiError> {
        Ok(self.repo.count(conn).await?)
    }

    pub async fn query(
        &self,
        conn: &mut R::Conn,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<GroupResponse>, ApiError> {
        Ok(self.repo.query(conn, offset, limit).await?)
    }

    pub async fn create(
        &self,
        conn: &mut R::Conn,
        req: GroupRequest,
    ) -> Result<GroupResponse, ApiError> {
        req.validate_fields()?;
        let id = Uuid::new_v4().to_string();
        self.repo
            .create(
                conn,
                &Group {
                    id: id.clone(),
                    career_id: req.career_id,
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
        req: GroupRequest,
    ) -> Result<GroupResponse, ApiError> {
        req.validate_fields()?;
        let mut group = self.repo.get(conn, id).await?;

        group.career_id = req.career_id;
        group.name = req.name;
        group.is_active = req.is_active;

        self.repo.update(conn, &group).await?;
        self.get(conn, id).await
    }

    pub async fn delete(&self, conn: &mut R::Conn, id: &str) -> Result<GroupResponse, ApiError> {
        let group = self.get(conn, id).await?;
        self.repo.delete(conn, id).await?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryRepository, MemoryStore};

    fn service() -> GroupService<MemoryRepository> {
        GroupService::new(MemoryRepository)
    }

    fn request(name: &str) -> GroupRequest {
        GroupRequest {
            career_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_active: false,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let mut store = MemoryStore::default();
        let req = request("3B");
        let created = service().create(&mut store, req.clone()).await.unwrap();
        assert_eq!(created.career_id, req.career_id);
        assert_eq!(created.name, "3B");
        assert!(created.is_active);
        assert_eq!(service().get(&mut store, &created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn career_id_must_be_uuid_sized() {
        let mut store = MemoryStore::default();
        let req = GroupRequest {
            career_id: "c-1".into(),
            ..request("3B")
        };
        match service().create(&mut store, req).await {
            Err(ApiError::InvalidInput(errors)) => assert_eq!(errors[0].field, "career_id"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_removes_group() {
        let mut store = MemoryStore::default();
        let created = service().create(&mut store, request("3B")).await.unwrap();
        service().delete(&mut store, &created.id).await.unwrap();
        assert!(matches!(
            service().get(&mut store, &created.id).await,
            Err(ApiError::NotFound)
        ));
        assert_eq!(service().count(&mut store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn query_returns_id_ordered_window() {
        let mut store = MemoryStore::default();
        for name in ["1A", "1B", "2A", "2B", "3A"] {
            service().create(&mut store, request(name)).await.unwrap();
        }
        let all = service().query(&mut store, 0, 100).await.unwrap();
        let mut ids: Vec<_> = all.iter().map(|g| g.id.clone()).collect();
        ids.sort();
        assert_eq!(all.iter().map(|g| g.id.clone()).collect::<Vec<_>>(), ids);

        assert_eq!(service().query(&mut store, 1, 3).await.unwrap(), all[1..4].to_vec());
        assert_eq!(service().query(&mut store, 3, 10).await.unwrap(), all[3..].to_vec());
        assert!(service().query(&mut store, 5, 1).await.unwrap().is_empty());
    }
}
