use crate::schema::{building_access, buildings, careers, groups, roles, users};
use chrono::NaiveDateTime;
use diesel::{pg::Pg, AsChangeset, Insertable, Queryable, Selectable};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Selectable, Queryable, Insertable, AsChangeset, Debug, PartialEq)]
#[diesel(table_name = buildings)]
#[diesel(check_for_backend(Pg))]
#[diesel(treat_none_as_null = true)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_limit: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

#[derive(Clone, Selectable, Queryable, Insertable, AsChangeset, Debug, PartialEq)]
#[diesel(table_name = building_access)]
#[diesel(check_for_backend(Pg))]
#[diesel(treat_none_as_null = true)]
pub struct BuildingAccess {
    pub id: String,
    pub building_id: String,
    pub user_id: String,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Clone, Selectable, Queryable, Insertable, AsChangeset, Debug, PartialEq)]
#[diesel(table_name = careers)]
#[diesel(check_for_backend(Pg))]
pub struct Career {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(
    ToSchema, Serialize, Clone, Selectable, Queryable, Insertable, AsChangeset, Debug, PartialEq,
)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(Pg))]
pub struct Group {
    pub id: String,
    pub career_id: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(
    ToSchema, Serialize, Clone, Selectable, Queryable, Insertable, AsChangeset, Debug, PartialEq,
)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(Pg))]
#[diesel(treat_none_as_null = true)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Stored user row. `password` holds the bcrypt hash and must never leave
/// the service layer.
#[derive(Clone, Selectable, Queryable, Insertable, AsChangeset, Debug, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
#[diesel(treat_none_as_null = true)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub registration_number: Option<String>,
    pub career_id: Option<String>,
    pub group_id: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Public projection of a user attached to building access records.
#[derive(ToSchema, Serialize, Queryable, Clone, Debug, PartialEq)]
pub struct AccessUser {
    pub id: String,
    pub username: String,
    pub role_id: String,
    pub role_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub is_active: bool,
}

/// A building together with its count of open access sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingRecord {
    pub building: Building,
    pub active_users: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccessRecord {
    pub access: BuildingAccess,
    pub user: Option<AccessUser>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CareerRecord {
    pub career: Career,
    pub groups: Vec<Group>,
}

/// A user with the names of the role, career and group it references.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRecord {
    pub user: User,
    pub role_name: Option<String>,
    pub career_name: Option<String>,
    pub group_name: Option<String>,
}
