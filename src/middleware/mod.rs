pub mod auth;
pub mod credentials;
pub mod guards;
pub mod response;

pub use auth::{authenticate, authenticate_headers, AuthError, GuardError};
pub use credentials::Credentials;
pub use guards::{
    authorize_admin, authorize_self_or_admin, require_admin_middleware,
    require_self_or_admin_middleware, AuthenticatedAccount,
};
pub use response::{ApiResponse, ApiResult};
