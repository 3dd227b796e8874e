//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a [`Task`] stopped in the [`Background`].
pub type TaskError = Box<dyn Error + 'static>;

/// Background environment for running [`Task`]s.
///
/// Resolves once any of the spawned [`Task`]s fails.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set of tasks.
    set: task::LocalSet,

    /// Handles of spawned tasks along with their names.
    handles: Vec<(&'static str, task::JoinHandle<Result<(), TaskError>>)>,
}

impl Background {
    /// Spawns a new named [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        log::debug!("spawning `{name}` background task");
        let handle = self.set.spawn_local(future.map_err(move |e| {
            log::error!("`{name}` background task stopped: {e}");
            TaskError::from(e)
        }));
        self.handles.push((name, handle));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        future::try_join_all(iter::once(set.map(Ok).boxed_local()).chain(
            handles.into_iter().map(|(name, h)| {
                h.map(move |r| match r {
                    Ok(res) => res,
                    Err(e) => {
                        log::error!("`{name}` background task panicked: {e}");
                        Err(TaskError::from(e))
                    }
                })
                .boxed_local()
            }),
        ))
        .map_ok(drop)
        .boxed_local()
    }
}
