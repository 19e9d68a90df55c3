use super::error::*;
use crate::application_port::{CredentialService, LoginInput, RegisterInput};
use crate::domain_model::UserSummary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(user: UserSummary) -> Self {
        ApiResponse {
            ok: true,
            user: Some(user),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        ApiResponse {
            ok: false,
            user: None,
            error: Some(message.into()),
        }
    }
}

/// Absent and `null` fields read as empty and are rejected by the service.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> (String, String) {
        (
            self.username.unwrap_or_default(),
            self.password.unwrap_or_default(),
        )
    }
}

pub async fn register(
    body: CredentialsRequest,
    credential_service: Arc<dyn CredentialService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (username, password) = body.into_parts();
    let user = credential_service
        .register(RegisterInput { username, password })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

pub async fn login(
    body: CredentialsRequest,
    credential_service: Arc<dyn CredentialService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (username, password) = body.into_parts();
    let user = credential_service
        .login(LoginInput { username, password })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}
