//! [`Mailer`]-related implementations.

pub mod smtp;

use derive_more::{Display, Error as StdError, From};

use crate::domain::user;

pub use self::smtp::Smtp;

/// Email delivery operation.
pub use common::Handler as Mailer;

/// Plain-text email to be delivered by a [`Mailer`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    /// Recipients of this [`Message`].
    pub to: Vec<user::Email>,

    /// Address replies to this [`Message`] should be sent to, if any.
    pub reply_to: Option<user::Email>,

    /// Subject of this [`Message`].
    pub subject: String,

    /// Plain-text body of this [`Message`].
    pub body: String,
}

/// [`Mailer`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// No [`Mailer`] transport is configured.
    #[display("Mail transport is not configured")]
    NotConfigured,

    /// [`Message`] has no recipients.
    #[display("Message has no recipients")]
    NoRecipients,

    /// [`Smtp`] error.
    #[display("SMTP error: {_0}")]
    #[from]
    Smtp(smtp::Error),
}
