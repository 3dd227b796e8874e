//! [`Command`] for creating a new [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    unit,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Property`].
#[derive(Clone, Debug, From)]
pub struct CreateProperty {
    /// [`property::Listing`] of the new [`Property`].
    pub listing: property::Listing,
}

impl<Db, M> Command<CreateProperty> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<property::Id, unit::Issuing>>,
            Ok = property::Id,
            Err = Traced<database::Error>,
        > + Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty { listing } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let property = Property {
            id: tx
                .execute(Select(By::new(unit::Issuing)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
            listing,
        };
        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
