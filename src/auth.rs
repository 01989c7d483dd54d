use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
    Json, RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::error::{ApiError, StoreError};
use crate::user::UserResponse;
use crate::validate::JsonBody;
use crate::AUTH_TAG;

/// Signing material for access tokens.
#[derive(Clone)]
pub struct Keys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl Keys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    pub fn issue(&self, user: &UserResponse) -> Result<String, ApiError> {
        let exp = TimeDelta::try_hours(self.ttl_hours)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                tracing::error!("token lifetime of {} hours is out of range", self.ttl_hours);
                ApiError::Internal
            })?;
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role_id.clone(),
            exp: exp.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("token creation: {}", e);
            ApiError::Internal
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token rejected: {}", e);
                ApiError::Unauthorized("Invalid token")
            })
    }
}

/// Identity carried by a bearer token. Taking it as a handler argument is
/// what puts a route behind authentication.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    /// Role id
    pub role: String,
    pub exp: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    Keys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized("Missing credentials"))?;
        Keys::from_ref(state).verify(bearer.token())
    }
}

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub fn router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new().routes(routes!(login))
}

#[derive(ToSchema, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, ToSchema, Serialize, Deserialize)]
pub struct AuthBody {
    pub access_token: String,
    pub token_type: String,
}

/// Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = Credentials,
    responses(
        (status = OK, body = AuthBody),
        (status = UNAUTHORIZED, description = "Wrong credentials")
    ),
    tag = AUTH_TAG
)]
async fn login(
    State(state): State<crate::State>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<AuthBody>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let user = state
        .users
        .authenticate(&mut *conn, &credentials.username, &credentials.password)
        .await?;
    let access_token = state.keys.issue(&user)?;

    Ok(Json(AuthBody {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserResponse {
        UserResponse {
            id: "6f1c2b7e-4a4e-4d53-9f0e-0a3c5b1d2e3f".into(),
            username: "jdoe".into(),
            role_id: "0b8e7f64-5c1a-4b2e-8d3f-9a7c6e5d4b3a".into(),
            ..UserResponse::default()
        }
    }

    #[test]
    fn issued_token_verifies() {
        let keys = Keys::new("secret", 1);
        let token = keys.issue(&user()).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user().id);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, user().role_id);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = Keys::new("secret", 1).issue(&user()).unwrap();
        assert!(matches!(
            Keys::new("other", 1).verify(&token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = Keys::new("secret", -2);
        let token = keys.issue(&user()).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn oversized_lifetime_fails_without_panicking() {
        let keys = Keys::new("secret", i64::MAX);
        assert!(matches!(keys.issue(&user()), Err(ApiError::Internal)));
    }
}
