pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;

pub use jwt::JwtService;
pub use middleware::{auth_middleware, require_role, AuthState, RoleRequirement};
pub use models::{AuthCaller, JwtClaims, RoleClaim};
