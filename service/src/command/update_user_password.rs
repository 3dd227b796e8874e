//! [`Command`] for updating an [`user::Password`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Password;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an [`user::Password`].
#[derive(Clone, Debug)]
pub struct UpdateUserPassword {
    /// ID of the [`User`] which [`Password`] should be updated.
    pub user_id: user::Id,

    /// Current [`Password`] of the [`User`].
    pub old_password: SecretBox<user::Password>,

    /// New [`Password`] of the [`User`].
    pub new_password: SecretBox<user::Password>,

    /// Repeated new [`Password`], which must match the new one.
    pub confirmation: SecretBox<user::Password>,
}

impl<Db, M> Command<UpdateUserPassword> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
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
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserPassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserPassword {
            user_id,
            old_password,
            new_password,
            confirmation,
        } = cmd;

        if new_password.expose_secret() != confirmation.expose_secret() {
            return Err(tracerr::new!(E::ConfirmationMismatch));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        if !user.verify_password(old_password.expose_secret()) {
            return Err(tracerr::new!(E::WrongPassword));
        }

        user.password_hash = Some(
            user::PasswordHash::new(new_password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?,
        );
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUserPassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// New [`Password`] and its confirmation differ.
    #[display("New password and its confirmation do not match")]
    ConfirmationMismatch,

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Failed to hash the new [`Password`].
    #[display("Failed to hash a password: {_0}")]
    #[from]
    Hashing(user::HashingError),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// Wrong current [`Password`] provided.
    #[display("Wrong old password")]
    WrongPassword,
}
