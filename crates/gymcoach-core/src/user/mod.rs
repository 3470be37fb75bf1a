//! User accounts: registration, login, profile updates and lookup.

pub mod password;
pub mod service;

pub use service::{
    AuthenticatedUser, ProfileInput, RegisterInput, fetch_user, login, register, update_profile,
};
