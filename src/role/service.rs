use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::repository::RoleRepository;
use crate::error::ApiError;
use crate::model::Role;
use crate::validate::{not_blank, Validatable};

pub type RoleResponse = Role;

#[derive(ToSchema, Deserialize, Validate, Debug, Default, Clone)]
#[serde(default)]
pub struct RoleRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 128, message = "the length must be no more than 128")
    )]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct RoleService<R> {
    repo: R,
}

impl<R: RoleRepository> RoleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get(&self, conn: &mut R::Conn, id: &str) -> Result<RoleResponse, ApiError> {
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
    ) -> Result<Vec<RoleResponse>, ApiError> {
        Ok(self.repo.query(conn, offset, limit).await?)
    }

    pub async fn create(
        &self,
        conn: &mut R::Conn,
        req: RoleRequest,
    ) -> Result<RoleResponse, ApiError> {
        req.validate_fields()?;
        let id = Uuid::new_v4().to_string();
        self.repo
            .create(
                conn,
                &Role {
                    id: id.clone(),
                    name: req.name,
                    description: req.description,
                },
            )
            .await?;
        self.get(conn, &id).await
    }

    pub async fn update(
        &self,
        conn: &mut R::Conn,
        id: &str,
        req: RoleRequest,
    ) -> Result<RoleResponse, ApiError> {
        req.validate_fields()?;
        let mut role = self.repo.get(conn, id).await?;

        role.name = req.name;
        role.description = req.description;

        self.repo.update(conn, &role).await?;
        self.get(conn, id).await
    }

    pub async fn delete(&self, conn: &mut R::Conn, id: &str) -> Result<RoleResponse, ApiError> {
        let role = self.get(conn, id).await?;
        self.repo.delete(conn, id).await?;
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryRepository, MemoryStore};

    fn service() -> RoleService<MemoryRepository> {
        RoleService::new(MemoryRepository)
    }

    fn request(name: &str, description: Option<&str>) -> RoleRequest {
        RoleRequest {
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_keeps_description() {
        let mut store = MemoryStore::default();
        let created = service()
            .create(&mut store, request("admin", Some("Full access")))
            .await
            .unwrap();
        assert_eq!(created.name, "admin");
        assert_eq!(created.description.as_deref(), Some("Full access"));
        assert_eq!(service().get(&mut store, &created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_clears_omitted_description() {
        let mut store = MemoryStore::default();
        let created = service()
            .create(&mut store, request("admin", Some("Full access")))
            .await
            .unwrap();
        let updated = service()
            .update(&mut store, &created.id, request("staff", None))
            .await
            .unwrap();
        assert_eq!(updated.name, "staff");
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn update_of_missing_role_creates_nothing() {
        let mut store = MemoryStore::default();
        let result = service()
            .update(&mut store, "3f1e0c0a-0000-4000-8000-000000000000", request("staff", None))
            .await;
        assert!(matches!(result, Err(ApiError::NotFound)));
        assert_eq!(service().count(&mut store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_lookup() {
        let mut store = MemoryStore::default();
        let result = service().update(&mut store, "missing", request("", None)).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn delete_is_hard() {
        let mut store = MemoryStore::default();
        let created = service().create(&mut store, request("admin", None)).await.unwrap();
        let deleted = service().delete(&mut store, &created.id).await.unwrap();
        assert_eq!(deleted, created);
        assert!(store.roles.is_empty());
        assert!(matches!(
            service().delete(&mut store, &created.id).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_of_referenced_role_succeeds() {
        let mut store = MemoryStore::default();
        let role = service().create(&mut store, request("admin", None)).await.unwrap();
        let user_id = Uuid::new_v4().to_string();
        store.users.insert(
            user_id.clone(),
            crate::model::User {
                id: user_id.clone(),
                username: "jdoe".into(),
                password: "$2b$04$hash".into(),
                role_id: role.id.clone(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jdoe@example.com".into(),
                registration_number: None,
                career_id: None,
                group_id: None,
                is_active: true,
                created_at: chrono::Utc::now().naive_utc(),
                updated_at: None,
            },
        );

        service().delete(&mut store, &role.id).await.unwrap();
        assert!(store.roles.is_empty());
        assert_eq!(store.users[&user_id].role_id, role.id);
    }

    #[tokio::test]
    async fn query_returns_id_ordered_window() {
        let mut store = MemoryStore::default();
        for name in ["a", "b", "c", "d", "e"] {
            service().create(&mut store, request(name, None)).await.unwrap();
        }
        let all = service().query(&mut store, 0, 100).await.unwrap();
        let mut ids: Vec<_> = all.iter().map(|r| r.id.clone()).collect();
        ids.sort();
        assert_eq!(all.iter().map(|r| r.id.clone()).collect::<Vec<_>>(), ids);

        assert_eq!(service().query(&mut store, 2, 2).await.unwrap(), all[2..4].to_vec());
        assert_eq!(service().query(&mut store, 4, 2).await.unwrap(), all[4..].to_vec());
        assert!(service().query(&mut store, 5, 2).await.unwrap().is_empty());
    }
}
