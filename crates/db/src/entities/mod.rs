//! Database entities.

pub mod connection_request;
pub mod user;

pub use connection_request::Entity as ConnectionRequest;
pub use user::Entity as User;
