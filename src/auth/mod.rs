//! Authentication Module
//! Mission: Accounts, JWT sessions, password policy, and role gating

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, require_admin};
pub use models::{Claims, Role, User};
pub use user_store::UserStore;
