//! [`Command`] for updating personal details of a [`User`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for a [`User`] updating its own name, surname and email.
#[derive(Clone, Debug)]
pub struct UpdateAccountSettings {
    /// ID of the [`User`] to be updated.
    pub user_id: user::Id,

    /// New name of the [`User`].
    pub name: user::Name,

    /// New surname of the [`User`].
    pub surname: user::Name,

    /// New email of the [`User`].
    pub email: user::Email,
}

impl<Db, M> Command<UpdateAccountSettings> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
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
        cmd: UpdateAccountSettings,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateAccountSettings {
            user_id,
            name,
            surname,
            email,
        } = cmd;

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

        if user.email != email {
            let owner = tx
                .execute(Select(By::<Option<User>, _>::new(&email)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if owner.is_some() {
                return Err(tracerr::new!(E::EmailOccupied(email)));
            }
        }
        if user.name == name && user.surname == surname && user.email == email
        {
            return Ok(user);
        }

        user.name = name;
        user.surname = surname;
        user.email = email;
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateAccountSettings`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] belongs to another [`User`].
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}
