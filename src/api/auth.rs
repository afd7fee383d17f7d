use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{
    new_id, non_empty, now, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, Role,
    User,
};
use crate::AppState;

use super::error::{ApiError, ApiJson, ValidationErrorBuilder};
use super::validation::{
    validate_email, validate_password, validate_role, validate_username, validate_uuid,
};

/// Header carrying the acting user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Register a new user
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let username = non_empty(req.username);
    let email = non_empty(req.email).map(|e| e.trim().to_string());
    let password = req.password.filter(|p| !p.is_empty());

    let mut errors = ValidationErrorBuilder::new();
    errors
        .require("username", &username)
        .require("email", &email)
        .require("password", &password);

    if let Some(Err(e)) = username.as_deref().map(validate_username) {
        errors.add("username", e);
    }
    if let Some(Err(e)) = email.as_deref().map(validate_email) {
        errors.add("email", e);
    }
    if let Some(Err(e)) = password.as_deref().map(validate_password) {
        errors.add("password", e);
    }
    let role = match validate_role(req.role.as_deref()) {
        Ok(role) => Some(role),
        Err(e) => {
            errors.add("role", e);
            None
        }
    };
    errors.finish()?;

    let (Some(username), Some(email), Some(password), Some(role)) =
        (username, email, password, role)
    else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("User with this email already exists"));
    }

    let password_hash = hash_password(&password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    let id = new_id();
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(now())
    .execute(&state.db)
    .await
    .map_err(|e| match e {
        // Lost a race with a concurrent registration for the same email
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            ApiError::conflict("User with this email already exists")
        }
        other => ApiError::from(other),
    })?;

    info!(user_id = %id, role = %role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: id,
        }),
    ))
}

/// Check credentials. No session is created; callers re-send credentials
/// or identify themselves with `X-User-Id` on later requests.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = non_empty(req.email).map(|e| e.trim().to_string());
    let password = req.password.filter(|p| !p.is_empty());

    let mut errors = ValidationErrorBuilder::new();
    errors
        .require("email", &email)
        .require("password", &password);
    errors.finish()?;

    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = match user {
        Some(user) if verify_password(&password, &user.password_hash) => user,
        _ => return Err(ApiError::unauthorized("Invalid email or password")),
    };

    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        role: user.role().to_string(),
        user_id: user.id,
    }))
}

/// Read and check the `X-User-Id` header, if the request has one
fn header_user_id(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let id = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid user ID"))?
        .trim();
    validate_uuid(id, "user ID").map_err(|_| ApiError::bad_request("Invalid user ID"))?;

    Ok(Some(id.to_string()))
}

/// The user a request acts on behalf of.
///
/// Taken from the `X-User-Id` header; requests without one act as the
/// configured placeholder user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user_id) = header_user_id(&parts.headers)? {
            return Ok(Caller { user_id });
        }

        let user_id = state.config.marketplace.placeholder_user_id.clone();
        validate_uuid(&user_id, "user ID").map_err(|_| ApiError::bad_request("Invalid user ID"))?;
        Ok(Caller { user_id })
    }
}

/// Admin gate: only installed on the admin routes when
/// `admin.require_admin_role` is set.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = header_user_id(request.headers())?
        .ok_or_else(|| ApiError::unauthorized("Admin identity required"))?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    if user.role() != Role::Admin {
        tracing::warn!(user_id = %user.id, "Non-admin user denied access to admin routes");
        return Err(ApiError::forbidden("Admin role required"));
    }

    Ok(next.run(request).await)
}
