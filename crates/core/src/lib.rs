//! Core business logic for devlink.
//!
//! Services own the workflow rules; [`validation`] holds the pure input
//! checks and normalizers they run before touching storage, and [`views`]
//! the projections handed to clients.

pub mod services;
pub mod validation;
pub mod views;

pub use services::*;
