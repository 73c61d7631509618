//! Business logic services

pub mod assertion;
pub mod auth;
pub mod car;
pub mod password;

pub use auth::{AuthError, AuthService};
pub use car::{CarService, CarServiceError};
