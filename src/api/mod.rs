mod error;
mod handler;
mod router;

pub use error::{ApiErrorCode, recover_error};
pub use handler::ApiResponse;
pub use router::routes;

use crate::application_port::CredentialService;
use crate::pages;
use crate::settings::Http;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// Every route the process serves, with rejection recovery and request logging.
pub fn app(
    credential_service: Arc<dyn CredentialService>,
    http: Http,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    routes(credential_service)
        .or(pages::routes(http.static_dir, http.views_dir))
        .recover(recover_error)
        .with(warp::log("credential_gate::http"))
}
