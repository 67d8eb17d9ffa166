//! Business logic services.

#![allow(missing_docs)]

pub mod connection;
pub mod token;
pub mod user;

pub use connection::{ConnectionOutcome, ConnectionService, ReviewDecision, SendAction};
pub use token::{Claims, TokenService};
pub use user::UserService;
