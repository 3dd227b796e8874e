//! Infrastructure layer.

pub mod database;
pub mod mailer;

pub use self::{
    database::Database,
    mailer::{Mailer, Smtp},
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
