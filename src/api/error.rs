use crate::api::handler::ApiResponse;
use crate::application_port::*;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply, reject};

const NOT_FOUND_BODY: &str = "404 - No encontrado";

/// Turns rejections into the wire shape. Our own error codes become JSON with
/// their status; malformed bodies are client errors; anything else that fell
/// through every route is a plain-text 404.
pub async fn recover_error(err: Rejection) -> Result<Response, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<reject::UnsupportedMediaType>().is_some()
        || err.find::<reject::PayloadTooLarge>().is_some()
        || err.find::<reject::LengthRequired>().is_some()
    {
        ApiErrorCode::InvalidBody
    } else {
        let reply = warp::reply::with_status(NOT_FOUND_BODY, StatusCode::NOT_FOUND);
        return Ok(reply.into_response());
    };

    let json = warp::reply::json(&ApiResponse::err(code.to_string()));
    Ok(warp::reply::with_status(json, code.status()).into_response())
}

#[derive(Debug, Clone, Error)]
pub enum ApiErrorCode {
    #[error("Username and password are required")]
    MissingFields,
    #[error("Invalid request body")]
    InvalidBody,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Service unavailable")]
    StoreUnavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::MissingFields | ApiErrorCode::InvalidBody => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UsernameTaken => StatusCode::CONFLICT,
            ApiErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<CredentialError> for ApiErrorCode {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::MissingFields => ApiErrorCode::MissingFields,
            CredentialError::Conflict => ApiErrorCode::UsernameTaken,
            CredentialError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            CredentialError::StoreUnavailable(e) => {
                warn!("Store unavailable: {}", e);
                ApiErrorCode::StoreUnavailable
            }
            CredentialError::NotFound => ApiErrorCode::internal("user document vanished"),
            CredentialError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}
