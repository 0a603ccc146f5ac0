//! Authentication routes
//!
//! - POST /auth/login - exchange the admin email for a session token
//! - POST /auth/register - create an admin user (only when enabled)
//! - GET /auth/me - claims of the presented token

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::common::{json_response, parse_json, read_body, require_auth, BoxError};
use crate::auth::{hash_password, TokenInput};
use crate::server::{AppState, BoxBody};
use crate::store::UserRecord;
use crate::types::{AdminError, Result};

/// Login body. A `password` field may be sent but is not checked.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// RFC 3339 expiry
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Handle POST /auth/login
pub async fn handle_login<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let body = read_body(req.into_body(), state.args.max_body_bytes).await?;
    let login: LoginRequest = parse_json(&body)?;

    if login.email != state.args.admin_email {
        warn!(email = %login.email, "Login rejected");
        return Err(AdminError::Unauthorized("Invalid credentials".into()));
    }

    let issued = state.jwt.generate_token(TokenInput::admin(login.email.clone()))?;
    let expires_at = chrono::DateTime::from_timestamp(issued.expires_at as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    info!(email = %login.email, "Admin logged in");

    Ok(json_response(
        StatusCode::OK,
        &LoginResponse {
            token: issued.token,
            expires_at,
        },
    ))
}

/// Handle POST /auth/register
pub async fn handle_register<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if !state.args.allow_registration {
        return Err(AdminError::NotFound("Registration is disabled".into()));
    }

    let body = read_body(req.into_body(), state.args.max_body_bytes).await?;
    let register: RegisterRequest = parse_json(&body)?;

    let email = register.email.trim().to_string();
    if email.is_empty() || register.password.is_empty() {
        return Err(AdminError::Validation("Email and password required".into()));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AdminError::Conflict(format!("User {} already exists", email)));
    }

    let user = state
        .users
        .insert_user(UserRecord {
            id: None,
            email,
            password_hash: hash_password(&register.password)?,
            role: "admin".into(),
        })
        .await?;

    info!(email = %user.email, "Admin user created");

    Ok(json_response(
        StatusCode::CREATED,
        &serde_json::json!({ "message": "Admin user created" }),
    ))
}

/// Handle GET /auth/me
pub fn handle_me<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>> {
    let claims = require_auth(state, req.headers())?;
    Ok(json_response(StatusCode::OK, &claims))
}
