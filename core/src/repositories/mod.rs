//! Repository interfaces for the user directory.

pub mod user;

pub use user::{MockUserRepository, UserRepository};
