//! Demo route collections registered by the binary.

pub mod auth;
pub mod hello_world;

pub use auth::JwtConfig;
