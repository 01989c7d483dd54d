//! In-memory stand-ins for the Postgres repositories. The store plays the
//! part of the connection, so services are driven exactly as in production.

use std::collections::BTreeMap;

use async_trait::async_trait;
use diesel::result::DatabaseErrorKind;

use crate::building::BuildingRepository;
use crate::building_access::{AccessFilter, BuildingAccessRepository};
use crate::career::CareerRepository;
use crate::error::StoreError;
use crate::group::GroupRepository;
use crate::model::{
    AccessRecord, AccessUser, Building, BuildingAccess, BuildingRecord, Career, CareerRecord,
    Group, Role, User, UserRecord,
};
use crate::role::RoleRepository;
use crate::user::UserRepository;

/// Tables keyed by id. Iteration order matches `ORDER BY id`.
#[derive(Default, Debug)]
pub struct MemoryStore {
    pub buildings: BTreeMap<String, Building>,
    pub accesses: BTreeMap<String, BuildingAccess>,
    pub careers: BTreeMap<String, Career>,
    pub groups: BTreeMap<String, Group>,
    pub roles: BTreeMap<String, Role>,
    pub users: BTreeMap<String, User>,
}

#[derive(Clone, Copy, Default)]
pub struct MemoryRepository;

fn window<'a, T: Clone + 'a>(
    rows: impl Iterator<Item = &'a T>,
    offset: i64,
    limit: i64,
) -> Vec<T> {
    rows.skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

fn unique_violation() -> StoreError {
    StoreError::Query(diesel::result::Error::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(String::from("duplicate key value violates unique constraint")),
    ))
}

fn insert<T: Clone>(
    table: &mut BTreeMap<String, T>,
    id: &str,
    row: &T,
) -> Result<(), StoreError> {
    if table.contains_key(id) {
        return Err(unique_violation());
    }
    table.insert(id.to_string(), row.clone());
    Ok(())
}

fn replace<T: Clone>(
    table: &mut BTreeMap<String, T>,
    id: &str,
    row: &T,
) -> Result<(), StoreError> {
    let slot = table.get_mut(id).ok_or(StoreError::NotFound)?;
    *slot = row.clone();
    Ok(())
}

fn remove<T>(table: &mut BTreeMap<String, T>, id: &str) -> Result<(), StoreError> {
    table.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
}

fn building_record(store: &MemoryStore, building: &Building) -> BuildingRecord {
    let active_users = store
        .accesses
        .values()
        .filter(|a| a.building_id == building.id && a.check_out.is_none())
        .count() as i64;
    BuildingRecord {
        building: building.clone(),
        active_users,
    }
}

fn access_record(store: &MemoryStore, access: &BuildingAccess) -> AccessRecord {
    let user = store.users.get(&access.user_id).map(|u| AccessUser {
        id: u.id.clone(),
        username: u.username.clone(),
        role_id: u.role_id.clone(),
        role_name: store.roles.get(&u.role_id).map(|r| r.name.clone()),
        first_name: u.first_name.clone(),
        last_name: u.last_name.clone(),
        created_at: u.created_at,
        updated_at: u.updated_at,
        is_active: u.is_active,
    });
    AccessRecord {
        access: access.clone(),
        user,
    }
}

fn career_record(store: &MemoryStore, career: &Career) -> CareerRecord {
    CareerRecord {
        career: career.clone(),
        groups: store
            .groups
            .values()
            .filter(|g| g.career_id == career.id)
            .cloned()
            .collect(),
    }
}

fn user_record(store: &MemoryStore, user: &User) -> UserRecord {
    UserRecord {
        user: user.clone(),
        role_name: store.roles.get(&user.role_id).map(|r| r.name.clone()),
        career_name: user
            .career_id
            .as_ref()
            .and_then(|id| store.careers.get(id))
            .map(|c| c.name.clone()),
        group_name: user
            .group_id
            .as_ref()
            .and_then(|id| store.groups.get(id))
            .map(|g| g.name.clone()),
    }
}

#[async_trait]
impl BuildingRepository for MemoryRepository {
    type Conn = MemoryStore;

    async fn get(&self, store: &mut MemoryStore, id: &str) -> Result<BuildingRecord, StoreError> {
        let building = store.buildings.get(id).ok_or(StoreError::NotFound)?;
        Ok(building_record(store, building))
    }

    async fn count(&self, store: &mut MemoryStore) -> Result<i64, StoreError> {
        Ok(store.buildings.len() as i64)
    }

    async fn query(
        &self,
        store: &mut MemoryStore,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BuildingRecord>, StoreError> {
        Ok(window(store.buildings.values(), offset, limit)
            .iter()
            .map(|b| building_record(store, b))
            .collect())
    }

    async fn create(&self, store: &mut MemoryStore, building: &Building) -> Result<(), StoreError> {
        insert(&mut store.buildings, &building.id, building)
    }

    async fn update(&self, store: &mut MemoryStore, building: &Building) -> Result<(), StoreError> {
        replace(&mut store.buildings, &building.id, building)
    }

    async fn delete(&self, store: &mut MemoryStore, id: &str) -> Result<(), StoreError> {
        remove(&mut store.buildings, id)
    }
}

#[async_trait]
impl BuildingAccessRepository for MemoryRepository {
    type Conn = MemoryStore;

    async fn get(&self, store: &mut MemoryStore, id: &str) -> Result<AccessRecord, StoreError> {
        let access = store.accesses.get(id).ok_or(StoreError::NotFound)?;
        Ok(access_record(store, access))
    }

    async fn count(&self, store: &mut MemoryStore) -> Result<i64, StoreError> {
        Ok(store.accesses.len() as i64)
    }

    async fn query(
        &self,
        store: &mut MemoryStore,
        offset: i64,
        limit: i64,
        filter: &AccessFilter,
    ) -> Result<Vec<AccessRecord>, StoreError> {
        let rows = store.accesses.values().filter(|a| match filter {
            AccessFilter::All => true,
            AccessFilter::OpenInBuilding(None) => false,
            AccessFilter::OpenInBuilding(Some(building_id)) => {
                a.building_id == *building_id && a.check_out.is_none()
            }
        });
        Ok(window(rows, offset, limit)
            .iter()
            .map(|a| access_record(store, a))
            .collect())
    }

    async fn create(
        &self,
        store: &mut MemoryStore,
        access: &BuildingAccess,
    ) -> Result<(), StoreError> {
        insert(&mut store.accesses, &access.id, access)
    }

    async fn update(
        &self,
        store: &mut MemoryStore,
        access: &BuildingAccess,
    ) -> Result<(), StoreError> {
        replace(&mut store.accesses, &access.id, access)
    }

    async fn delete(&self, store: &mut MemoryStore, id: &str) -> Result<(), StoreError> {
        remove(&mut store.accesses, id)
    }
}

#[async_trait]
impl CareerRepository for MemoryRepository {
    type Conn = MemoryStore;

    async fn get(&self, store: &mut MemoryStore, id: &str) -> Result<CareerRecord, StoreError> {
        let career = store.careers.get(id).ok_or(StoreError::NotFound)?;
        Ok(career_record(store, career))
    }

    async fn count(&self, store: &mut MemoryStore) -> Result<i64, StoreError> {
        Ok(store.careers.len() as i64)
    }

    async fn query(
        &self,
        store: &mut MemoryStore,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<CareerRecord>, StoreError> {
        Ok(window(store.careers.values(), offset, limit)
            .iter()
            .map(|c| career_record(store, c))
            .collect())
    }

    async fn create(&self, store: &mut MemoryStore, career: &Career) -> Result<(), StoreError> {
        insert(&mut store.careers, &career.id, career)
    }

    async fn update(&self, store: &mut MemoryStore, career: &Career) -> Result<(), StoreError> {
        replace(&mut store.careers, &career.id, career)
    }
}

#[async_trait]
impl GroupRepository for MemoryRepository {
    type Conn = MemoryStore;

    async fn get(&self, store: &mut MemoryStore, id: &str) -> Result<Group, StoreError> {
        store.groups.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn count(&self, store: &mut MemoryStore) -> Result<i64, StoreError> {
        Ok(store.groups.len() as i64)
    }

    async fn query(
        &self,
        store: &mut MemoryStore,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Group>, StoreError> {
        Ok(window(store.groups.values(), offset, limit))
    }

    async fn create(&self, store: &mut MemoryStore, group: &Group) -> Result<(), StoreError> {
        insert(&mut store.groups, &group.id, group)
    }

    async fn update(&self, store: &mut MemoryStore, group: &Group) -> Result<(), StoreError> {
        replace(&mut store.groups, &group.id, group)
    }

    async fn delete(&self, store: &mut MemoryStore, id: &str) -> Result<(), StoreError> {
        remove(&mut store.groups, id)
    }
}

#[async_trait]
impl RoleRepository for MemoryRepository {
    type Conn = MemoryStore;

    async fn get(&self, store: &mut MemoryStore, id: &str) -> Result<Role, StoreError> {
        store.roles.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn count(&self, store: &mut MemoryStore) -> Result<i64, StoreError> {
        Ok(store.roles.len() as i64)
    }

    async fn query(
        &self,
        store: &mut MemoryStore,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Role>, StoreError> {
        Ok(window(store.roles.values(), offset, limit))
    }

    async fn create(&self, store: &mut MemoryStore, role: &Role) -> Result<(), StoreError> {
        insert(&mut store.roles, &role.id, role)
    }

    async fn update(&self, store: &mut MemoryStore, role: &Role) -> Result<(), StoreError> {
        replace(&mut store.roles, &role.id, role)
    }

    async fn delete(&self, store: &mut MemoryStore, id: &str) -> Result<(), StoreError> {
        remove(&mut store.roles, id)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    type Conn = MemoryStore;

    async fn get(&self, store: &mut MemoryStore, id: &str) -> Result<UserRecord, StoreError> {
        let user = store.users.get(id).ok_or(StoreError::NotFound)?;
        Ok(user_record(store, user))
    }

    async fn count(&self, store: &mut MemoryStore) -> Result<i64, StoreError> {
        Ok(store.users.len() as i64)
    }

    async fn query(
        &self,
        store: &mut MemoryStore,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserRecord>, StoreError> {
        Ok(window(store.users.values(), offset, limit)
            .iter()
            .map(|u| user_record(store, u))
            .collect())
    }

    async fn create(&self, store: &mut MemoryStore, user: &User) -> Result<(), StoreError> {
        if store.users.values().any(|u| u.username == user.username) {
            return Err(unique_violation());
        }
        insert(&mut store.users, &user.id, user)
    }

    async fn update(&self, store: &mut MemoryStore, user: &User) -> Result<(), StoreError> {
        replace(&mut store.users, &user.id, user)
    }

    async fn delete(&self, store: &mut MemoryStore, id: &str) -> Result<(), StoreError> {
        remove(&mut store.users, id)
    }

    async fn find_by_username(
        &self,
        store: &mut MemoryStore,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(store.users.values().find(|u| u.username == username).cloned())
    }
}
