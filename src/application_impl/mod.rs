mod credential_hasher_impl;
mod credential_service_impl;

pub use credential_hasher_impl::*;
pub use credential_service_impl::*;
