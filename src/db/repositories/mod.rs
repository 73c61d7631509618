//! Repository layer
//!
//! One trait + SQLx implementation per aggregate. Traits keep the services
//! testable and the SQL in one place.

pub mod car;
pub mod dealer;
pub mod session;

pub use car::{CarRepository, SqlxCarRepository};
pub use dealer::{DealerRepository, SqlxDealerRepository};
pub use session::{SessionTokenRepository, SqlxSessionTokenRepository};
