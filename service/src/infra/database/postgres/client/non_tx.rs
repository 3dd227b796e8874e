//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Clones share the same lazily acquired pooled [`Connection`], which is
/// returned to the [`connection::Pool`] once the last clone is dropped.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire the [`Connection`] from.
    pub(crate) pool: connection::Pool,

    /// [`Connection`] acquired on the first operation.
    connection: Arc<OnceCell<connection::NonTx>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            connection: Arc::new(OnceCell::new()),
        }
    }

    /// Returns a new [`NonTx`] client sharing the [`connection::Pool`] of this
    /// one, but not its [`Connection`].
    #[must_use]
    pub fn scoped(&self) -> Self {
        Self::from_pool(self.pool.clone())
    }

    /// Returns the underlying [`Connection`] of this [`NonTx`] client,
    /// acquiring it from the [`connection::Pool`] if needed.
    async fn connection(
        &self,
    ) -> Result<&connection::NonTx, Traced<database::Error>> {
        self.connection
            .get_or_try_init(|| async {
                self.pool
                    .get()
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            })
            .await
    }
}

impl Connection for NonTx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_one<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query_one(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn batch_exec(
        &self,
        query: &str,
    ) -> Result<(), Traced<database::Error>> {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .batch_exec(query)
            .await
            .map_err(tracerr::wrap!())
    }
}
