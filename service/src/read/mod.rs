//! Read entities definitions.

pub mod property;
pub mod user;
