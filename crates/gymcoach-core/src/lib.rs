//! Domain logic for gymcoach: the training cycle, the plan store read path,
//! users and sessions, the chat relay and the activity log.

pub mod activity;
pub mod chat;
pub mod error;
pub mod plan;
pub mod token;
pub mod user;

pub use error::CoachError;
