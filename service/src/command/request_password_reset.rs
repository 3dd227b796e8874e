//! [`Command`] for requesting a [`PasswordReset`].

use common::operations::{
    By, Commit, Deliver, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        user::{self, PasswordReset},
        User,
    },
    infra::{database, mailer, Database, Mailer},
    Service,
};

use super::Command;

/// [`Command`] for issuing a [`PasswordReset`] and emailing its link to the
/// [`User`].
///
/// Unknown emails are accepted silently.
#[derive(Clone, Debug, From)]
pub struct RequestPasswordReset {
    /// Email of the [`User`] who forgot the password.
    pub email: user::Email,
}

impl<Db, M> Command<RequestPasswordReset> for Service<Db, M>
where
    Db: for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
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
        cmd: RequestPasswordReset,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestPasswordReset { email } = cmd;

        let Some(user) = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            log::debug!("password reset requested for unknown `{email}`");
            return Ok(());
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let Some(mut user) = tx
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(());
        };

        let reset = PasswordReset::issue();
        user.password_reset = Some(reset);
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let link = format!(
            "{}?token={}",
            self.config().links.password_reset,
            reset.token,
        );
        self.mailer()
            .execute(Deliver(mailer::Message {
                to: vec![user.email],
                reply_to: None,
                subject: "Password reset".to_owned(),
                body: format!(
                    "Hello {},\n\n\
                     To reset your password, follow the link below:\n\
                     {link}\n\n\
                     The link expires in {} minutes. If you did not request \
                     a password reset, ignore this email.\n",
                    user.name,
                    self.config().expire_reset_tokens.ttl.as_secs() / 60,
                ),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RequestPasswordReset`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    Mailer(mailer::Error),
}
