//! [`Command`] for reporting an issue to the administrators.

use common::operations::{By, Deliver, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, mailer, Database, Mailer},
    read, Service,
};

use super::Command;

/// [`Command`] for reporting an issue noticed by a [`User`].
#[derive(Clone, Debug)]
pub struct ReportIssue {
    /// ID of the reporting [`User`].
    pub user_id: user::Id,

    /// Short summary of the issue.
    pub subject: String,

    /// Description of the issue.
    pub description: String,
}

impl<Db, M> Command<ReportIssue> for Service<Db, M>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
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

    async fn execute(&self, cmd: ReportIssue) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReportIssue {
            user_id,
            subject,
            description,
        } = cmd;

        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let admins = self
            .database()
            .execute(Select(By::<read::user::AdminEmails, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if admins.is_empty() {
            return Err(tracerr::new!(E::NoAdmins));
        }

        self.mailer()
            .execute(Deliver(mailer::Message {
                to: admins.into(),
                subject: format!("Issue report: {subject}"),
                body: format!(
                    "Reported by: {} {} <{}>\n\n{description}\n",
                    user.name, user.surname, user.email,
                ),
                reply_to: Some(user.email),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ReportIssue`] [`Command`] execution.
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

    /// There is no administrator to deliver the report to.
    #[display("No administrators to deliver the report to")]
    NoAdmins,

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}
