//! [`Command`] for resetting a forgotten [`user::Password`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Password, PasswordReset};
use crate::{
    domain::{
        user::{self, password_reset},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for setting a new [`Password`] by a [`PasswordReset`] token.
///
/// The token is consumed on success.
#[derive(Clone, Debug)]
pub struct ResetPassword {
    /// [`password_reset::Token`] emailed to the [`User`].
    pub token: password_reset::Token,

    /// New [`Password`] of the [`User`].
    pub new_password: SecretBox<user::Password>,

    /// Repeated new [`Password`], which must match the new one.
    pub confirmation: SecretBox<user::Password>,
}

impl<Db, M> Command<ResetPassword> for Service<Db, M>
where
    Db: Database<
            Select<By<Option<User>, password_reset::Token>>,
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
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResetPassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResetPassword {
            token,
            new_password,
            confirmation,
        } = cmd;

        if new_password.expose_secret() != confirmation.expose_secret() {
            return Err(tracerr::new!(E::ConfirmationMismatch));
        }

        let user_id = self
            .database()
            .execute(Select(By::new(token)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvalidToken)
            .map_err(tracerr::wrap!())?
            .id;

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
            .ok_or(E::InvalidToken)
            .map_err(tracerr::wrap!())?;
        let reset = user
            .password_reset
            .filter(|r| r.token == token)
            .ok_or(E::InvalidToken)
            .map_err(tracerr::wrap!())?;
        let ttl = self.config().expire_reset_tokens.ttl;
        if reset.is_expired(ttl, password_reset::IssuingDateTime::now()) {
            return Err(tracerr::new!(E::TokenExpired));
        }

        user.password_hash = Some(
            user::PasswordHash::new(new_password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?,
        );
        user.password_reset = None;
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`ResetPassword`] [`Command`] execution.
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

    /// [`password_reset::Token`] is unknown or already consumed.
    #[display("Password reset token is invalid")]
    InvalidToken,

    /// [`password_reset::Token`] is older than allowed.
    #[display("Password reset token has expired")]
    TokenExpired,
}
