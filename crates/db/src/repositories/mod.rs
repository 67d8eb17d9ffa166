//! Repositories wrapping entity queries.

mod connection_request;
mod user;

pub use connection_request::ConnectionRequestRepository;
pub use user::UserRepository;
