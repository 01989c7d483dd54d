pub mod auth;
pub mod building;
pub mod building_access;
pub mod career;
mod config;
mod error;
pub mod group;
mod model;
mod pagination;
pub mod role;
mod schema;
#[cfg(test)]
mod testing;
pub mod user;
pub mod validate;

use std::net::Ipv4Addr;

use auth::{Keys, SecurityAddon};
use axum::extract::FromRef;
use axum::Router;
use building::{BuildingService, PgBuildingRepository};
use building_access::{BuildingAccessService, PgBuildingAccessRepository};
use career::{CareerService, PgCareerRepository};
use config::Config;
use diesel::{pg::Pg, Connection, PgConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use group::{GroupService, PgGroupRepository};
use role::{PgRoleRepository, RoleService};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use user::{PgUserRepository, UserService};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

const AUTH_TAG: &str = "auth";
const BUILDING_TAG: &str = "building";
const BUILDING_ACCESS_TAG: &str = "building access";
const CAREER_TAG: &str = "career";
const GROUP_TAG: &str = "group";
const ROLE_TAG: &str = "role";
const USER_TAG: &str = "user";

type Pool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

#[derive(Clone)]
pub struct State {
    pool: Pool,
    keys: Keys,
    buildings: BuildingService<PgBuildingRepository>,
    building_accesses: BuildingAccessService<PgBuildingAccessRepository>,
    careers: CareerService<PgCareerRepository>,
    groups: GroupService<PgGroupRepository>,
    roles: RoleService<PgRoleRepository>,
    users: UserService<PgUserRepository>,
}

impl State {
    fn new(pool: Pool, config: &Config) -> Self {
        Self {
            pool,
            keys: Keys::new(&config.jwt_secret, config.token_ttl_hours),
            buildings: BuildingService::new(PgBuildingRepository),
            building_accesses: BuildingAccessService::new(PgBuildingAccessRepository),
            careers: CareerService::new(PgCareerRepository),
            groups: GroupService::new(PgGroupRepository),
            roles: RoleService::new(PgRoleRepository),
            users: UserService::new(PgUserRepository, config.bcrypt_cost),
        }
    }
}

impl FromRef<State> for Keys {
    fn from_ref(state: &State) -> Self {
        state.keys.clone()
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    tags(
        (name = AUTH_TAG, description = "Token issuing"),
        (name = BUILDING_TAG, description = "Buildings and their occupancy"),
        (name = BUILDING_ACCESS_TAG, description = "Check-in and check-out records"),
        (name = CAREER_TAG, description = "Careers and their groups"),
        (name = GROUP_TAG, description = "Student groups"),
        (name = ROLE_TAG, description = "User roles"),
        (name = USER_TAG, description = "User accounts")
    )
)]
struct ApiDoc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn run_migrations(
    connection: &mut impl MigrationHarness<Pg>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    connection.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

fn app(state: State) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/auth", auth::router())
        .nest("/api", building::router())
        .nest("/api", building_access::router())
        .nest("/api", career::router())
        .nest("/api", group::router())
        .nest("/api", role::router())
        .nest("/api", user::router())
        .with_state(state)
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/apidoc/openapi.json", api))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_filter(filter),
        )
        .init();

    let mut migration_connection = PgConnection::establish(&config.database_url)?;
    run_migrations(&mut migration_connection)?;
    drop(migration_connection);
    // set up connection pool
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    let pool = bb8::Pool::builder().build(manager).await?;

    let router = app(State::new(pool, &config));

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.listen_port)).await?;
    info!("Listening on 0.0.0.0:{}", config.listen_port);
    Ok(axum::serve(listener, router).await?)
}
