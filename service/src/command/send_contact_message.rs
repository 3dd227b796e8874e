//! [`Command`] for sending a contact message to the administrators.

use common::operations::{By, Deliver, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::user,
    infra::{database, mailer, Database, Mailer},
    read, Service,
};

use super::Command;

/// [`Command`] for delivering a message from the contact form to all the
/// administrators.
#[derive(Clone, Debug)]
pub struct SendContactMessage {
    /// Name the sender introduced themselves with.
    pub name: String,

    /// [`user::Email`] to reply to.
    pub email: user::Email,

    /// Text of the message.
    pub message: String,
}

impl<Db, M> Command<SendContactMessage> for Service<Db, M>
where
    Db: Database<
        Select<By<read::user::AdminEmails, ()>>,
        Ok = read::user::AdminEmails,
        Err = Traced<database::Error>,
    >,
    M: Mailer<
        Deliver<mailer::Message>,
        Ok = (),
        Err = Traced<mailer::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SendContactMessage,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SendContactMessage {
            name,
            email,
            message,
        } = cmd;

        let admins = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if admins.is_empty() {
            return Err(tracerr::new!(E::NoAdmins));
        }

        self.mailer()
            .execute(Deliver(mailer::Message {
                to: admins.into(),
                subject: format!("Contact message from {name}"),
                body: format!("From: {name} <{email}>\n\n{message}\n"),
                reply_to: Some(email),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SendContactMessage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    #[from]
    Mailer(mailer::Error),

    /// There is no administrator to deliver the message to.
    #[display("No administrators to deliver the message to")]
    NoAdmins,
}
