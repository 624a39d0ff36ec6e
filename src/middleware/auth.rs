use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Error;
use crate::models::user::UpsertUser;
use crate::AppState;

const ADMIN_ROLE: &str = "admin";

/// Claims issued by the identity provider. Only `sub` and `exp` are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(ADMIN_ROLE))
    }
}

impl From<&Claims> for UpsertUser {
    fn from(claims: &Claims) -> Self {
        UpsertUser {
            id: claims.sub.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
            email: claims.email.clone(),
            profile_image_url: claims.profile_image_url.clone(),
            is_admin: claims.is_admin(),
        }
    }
}

fn reject(error: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": error, "code": "unauthorized" })))
        .into_response()
}

pub fn decode_bearer(header: Option<&str>, key: &DecodingKey) -> Result<Claims, &'static str> {
    let auth_str = header.ok_or("missing_authorization")?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("unsupported_scheme")?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|_| "invalid_token")
}

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = match req.headers().get(axum::http::header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(s) => Some(s),
            Err(_) => return reject("bad_authorization"),
        },
        None => None,
    };

    match decode_bearer(header, &state.decoding_key) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(error) => {
            tracing::debug!(error, "rejected request without valid bearer token");
            reject(error)
        }
    }
}

/// The authenticated caller, as resolved by `require_bearer_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub is_admin: bool,
    pub claims: Claims,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin {
            Ok(())
        } else {
            Err(Error::Forbidden("Admin access required".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Authentication required".to_string()))?;
        Ok(AuthUser {
            id: claims.sub.clone(),
            is_admin: claims.is_admin(),
            claims,
        })
    }
}
