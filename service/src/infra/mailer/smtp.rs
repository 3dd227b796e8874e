//! [SMTP] [`Mailer`] implementation.
//!
//! [SMTP]: https://datatracker.ietf.org/doc/html/rfc5321

use std::sync::Arc;

use common::operations::Deliver;
use derive_more::{Debug, Display, Error as StdError, From};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport as _, Tokio1Executor,
};
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user,
    infra::{mailer, Mailer},
};

/// [`Smtp`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Host of the SMTP relay.
    pub host: String,

    /// Port of the SMTP relay.
    pub port: u16,

    /// User to authenticate as, if any.
    pub username: Option<String>,

    /// Password to authenticate with.
    pub password: SecretString,

    /// Address the emails are sent from.
    pub from: String,
}

/// [SMTP] [`Mailer`] client.
///
/// [SMTP]: https://datatracker.ietf.org/doc/html/rfc5321
#[derive(Clone, Debug)]
pub struct Smtp(Option<Arc<Transport>>);

/// Configured SMTP transport along with the sender address.
#[derive(Debug)]
struct Transport {
    /// Underlying [`AsyncSmtpTransport`].
    #[debug(skip)]
    inner: AsyncSmtpTransport<Tokio1Executor>,

    /// [`Mailbox`] the emails are sent from.
    from: Mailbox,
}

impl Smtp {
    /// Creates a new [`Smtp`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the [`Config`] has an invalid relay or sender address.
    pub fn new(conf: &Config) -> Result<Self, Traced<mailer::Error>> {
        let from = conf
            .from
            .parse::<Mailbox>()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&conf.host)
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?
                .port(conf.port);
        if let Some(user) = &conf.username {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                conf.password.expose_secret().to_owned(),
            ));
        }

        Ok(Self(Some(Arc::new(Transport {
            inner: builder.build(),
            from,
        }))))
    }

    /// Creates a new [`Smtp`] client failing every delivery with
    /// [`mailer::Error::NotConfigured`].
    #[must_use]
    pub fn disabled() -> Self {
        Self(None)
    }
}

impl Mailer<Deliver<mailer::Message>> for Smtp {
    type Ok = ();
    type Err = Traced<mailer::Error>;

    async fn execute(
        &self,
        Deliver(msg): Deliver<mailer::Message>,
    ) -> Result<Self::Ok, Self::Err> {
        use mailer::Error as E;

        let Some(transport) = &self.0 else {
            return Err(tracerr::new!(E::NotConfigured));
        };
        if msg.to.is_empty() {
            return Err(tracerr::new!(E::NoRecipients));
        }

        let mut builder = lettre::Message::builder()
            .from(transport.from.clone())
            .subject(msg.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &msg.to {
            builder = builder.to(mailbox(to)?);
        }
        if let Some(reply_to) = &msg.reply_to {
            builder = builder.reply_to(mailbox(reply_to)?);
        }
        let email = builder
            .body(msg.body)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        drop(
            transport
                .inner
                .send(email)
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?,
        );
        log::debug!(subject = %msg.subject, "email delivered");

        Ok(())
    }
}

/// Converts the provided [`user::Email`] into a [`Mailbox`].
fn mailbox(email: &user::Email) -> Result<Mailbox, Traced<mailer::Error>> {
    AsRef::<str>::as_ref(email)
        .parse::<Mailbox>()
        .map_err(tracerr::from_and_wrap!(=> Error))
        .map_err(tracerr::map_from)
}

/// [`Smtp`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Invalid email address.
    #[display("Invalid email address: {_0}")]
    Address(lettre::address::AddressError),

    /// Failed to build a message.
    #[display("Failed to build a message: {_0}")]
    Message(lettre::error::Error),

    /// SMTP transport error.
    #[display("SMTP transport failed: {_0}")]
    Transport(lettre::transport::smtp::Error),
}

#[cfg(test)]
mod spec {
    use crate::domain::user;

    use super::mailbox;

    #[test]
    fn converts_email_into_mailbox() {
        let email = user::Email::new("anna@example.com").unwrap();

        let mailbox = mailbox(&email).unwrap();

        assert_eq!(mailbox.email.to_string(), "anna@example.com");
        assert_eq!(mailbox.name, None);
    }
}
