mod credential_hasher;
mod credential_service;

pub use credential_hasher::*;
pub use credential_service::*;
