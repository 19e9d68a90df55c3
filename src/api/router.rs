use super::handler;
use crate::application_port::CredentialService;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn routes(
    credential_service: Arc<dyn CredentialService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let register = warp::path!("api" / "register")
        .and(warp::post())
        .and(json_body())
        .and(with(credential_service.clone()))
        .and_then(handler::register);

    let login = warp::path!("api" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with(credential_service.clone()))
        .and_then(handler::login);

    register.or(login)
}

fn json_body() -> impl Filter<Extract = (handler::CredentialsRequest,), Error = warp::Rejection> + Clone
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
