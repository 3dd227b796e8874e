//! [`Command`] for bootstrapping the first administrator [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    unit, DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating the first administrator [`User`].
///
/// Refuses to do anything once any [`User`] exists.
#[derive(Clone, Debug)]
pub struct CreateAdminUser {
    /// Name of the administrator.
    pub name: user::Name,

    /// Surname of the administrator.
    pub surname: user::Name,

    /// Email of the administrator.
    pub email: user::Email,

    /// Password of the administrator.
    pub password: SecretBox<user::Password>,
}

impl<Db, M> Command<CreateAdminUser> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<read::user::TotalCount, ()>>,
            Ok = read::user::TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<user::Id, unit::Issuing>>,
            Ok = user::Id,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateAdminUser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAdminUser {
            name,
            surname,
            email,
            password,
        } = cmd;

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let total = tx
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *total > 0 {
            return Err(tracerr::new!(E::UsersExist));
        }

        let id = tx
            .execute(Select(By::new(unit::Issuing)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let user = User {
            id,
            name,
            surname,
            email,
            joined_at: DateTime::now().coerce(),
            has_access: true,
            is_admin: true,
            password_hash: Some(password_hash),
            password_reset: None,
        };
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateAdminUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Failed to hash the [`user::Password`].
    #[display("Failed to hash a password: {_0}")]
    #[from]
    Hashing(user::HashingError),

    /// Some [`User`]s exist already.
    #[display("Users exist already, so no administrator is bootstrapped")]
    UsersExist,
}
