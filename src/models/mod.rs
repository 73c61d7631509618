//! Domain models

pub mod car;
pub mod dealer;
pub mod session;

pub use car::{Car, NewCar, StockLevel};
pub use dealer::Dealer;
pub use session::SessionToken;
