//! [`ExpireResetTokens`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use smart_default::SmartDefault;
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::{password_reset, PasswordReset},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`ExpireResetTokens`] [`Task`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Interval between expired [`PasswordReset`]s cleaning.
    #[default(time::Duration::from_secs(60 * 60))]
    pub interval: time::Duration,

    /// Age after which a [`PasswordReset`] token is no longer accepted.
    #[default(time::Duration::from_secs(60 * 60))]
    pub ttl: time::Duration,
}

/// [`Task`] for clearing expired [`PasswordReset`] tokens.
#[derive(Clone, Copy, Debug)]
pub struct ExpireResetTokens<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, M> Task<Start<By<ExpireResetTokens<Self>, Config>>>
    for Service<Db, M>
where
    ExpireResetTokens<Service<Db, M>>:
        Task<Perform<()>, Ok = u64, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ExpireResetTokens<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ExpireResetTokens {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::info!("expired {n} password reset token(s)"),
                Err(e) => {
                    log::error!("`task::ExpireResetTokens` failed: {e}");
                }
            }
        }
    }
}

impl<Db, M> Task<Perform<()>> for ExpireResetTokens<Service<Db, M>>
where
    Db: Database<
        Delete<By<PasswordReset, password_reset::IssuingDateTime>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = u64;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = password_reset::IssuingDateTime::now() - self.config.ttl;
        self.service
            .database()
            .execute(Delete(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`ExpireResetTokens`] execution.
pub type ExecutionError = Traced<database::Error>;
