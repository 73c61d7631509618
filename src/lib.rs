//! CarStock - multi-tenant car dealer inventory API
//!
//! Dealers authenticate with name and password, receive a signed identity
//! assertion, and manage their own car inventory. Every inventory operation
//! is scoped to the authenticated dealer.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
