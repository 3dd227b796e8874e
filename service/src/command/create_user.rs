//! [`Command`] for registering a new [`User`].

use common::{
    operations::{By, Commit, Deliver, Insert, Select, Transact, Transacted},
    unit, DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password};
use crate::{
    domain::{user, User},
    infra::{database, mailer, Database, Mailer},
    read, Service,
};

use super::Command;

/// [`Command`] for registering a new [`User`].
///
/// The registered [`User`] has no access until an administrator grants it,
/// so all the administrators are alerted by email.
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// Surname of a new [`User`].
    pub surname: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db, M> Command<CreateUser> for Service<Db, M>
where
    Db: for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<user::Id, unit::Issuing>>,
            Ok = user::Id,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::user::AdminEmails, ()>>,
            Ok = read::user::AdminEmails,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    M: Mailer<
        Deliver<mailer::Message>,
        Ok = (),
        Err = Traced<mailer::Error>,
    >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            surname,
            email,
            password,
        } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let id = self
            .database()
            .execute(Select(By::new(unit::Issuing)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let user = User {
            id,
            name,
            surname,
            email,
            joined_at: DateTime::now().coerce(),
            has_access: false,
            is_admin: false,
            password_hash: Some(
                user::PasswordHash::new(password.expose_secret())
                    .map_err(tracerr::from_and_wrap!(=> E))?,
            ),
            password_reset: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let inserted = tx.execute(Insert(user.clone())).await;
        if inserted
            .as_ref()
            .is_err_and(|e| e.as_ref().is_unique_violation(None))
        {
            return Err(tracerr::new!(E::EmailOccupied(user.email)));
        }
        inserted
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Registration stands even if the alert is not delivered.
        if let Err(e) = self.alert_admins(&user).await {
            log::warn!("failed to alert admins about `User({})`: {e}", user.id);
        }

        Ok(user)
    }
}

impl<Db, M> Service<Db, M>
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
    /// Emails all the administrators about the newly registered [`User`].
    async fn alert_admins(
        &self,
        user: &User,
    ) -> Result<(), Traced<ExecutionError>> {
        let admins = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;

        self.mailer()
            .execute(Deliver(mailer::Message {
                to: admins.into(),
                reply_to: None,
                subject: "New user registration".to_owned(),
                body: format!(
                    "{} {} <{}> has registered and is awaiting access.\n\n\
                     Review pending users at {}\n",
                    user.name,
                    user.surname,
                    user.email,
                    self.config().links.admin_users,
                ),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already registered.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Failed to hash the [`user::Password`].
    #[display("Failed to hash a password: {_0}")]
    #[from]
    Hashing(user::HashingError),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    #[from]
    Mailer(mailer::Error),
}
