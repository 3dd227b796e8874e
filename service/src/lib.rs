//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::{error::Error, time::Duration};

use common::operations::{By, Start};
use derive_more::Debug;
use smart_default::SmartDefault;

#[cfg(doc)]
use infra::{Database, Mailer};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`Duration`] a signed in session stays valid.
    pub session_ttl: Duration,

    /// [`Links`] put into the sent emails.
    pub links: Links,

    /// [`task::ExpireResetTokens`] configuration.
    pub expire_reset_tokens: task::expire_reset_tokens::Config,
}

/// Public links of the application put into the sent emails.
#[derive(Clone, Debug, SmartDefault)]
pub struct Links {
    /// Base URL of the password reset page.
    ///
    /// The issued reset token is appended as a `token` query parameter.
    #[default("http://localhost:8080/reset_password".to_owned())]
    pub password_reset: String,

    /// URL of the users administration page.
    #[default("http://localhost:8080/admin_users".to_owned())]
    pub admin_users: String,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, M> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Mailer`] of this [`Service`].
    mailer: M,
}

impl<Db, M> Service<Db, M> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        mailer: M,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::ExpireResetTokens<Self>,
                        task::expire_reset_tokens::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            mailer,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("expire_reset_tokens", async move {
            svc.execute(Start(By::new(svc.config().expire_reset_tokens)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Mailer`] of this [`Service`].
    #[must_use]
    pub fn mailer(&self) -> &M {
        &self.mailer
    }
}

#[cfg(feature = "postgres")]
impl<M: Clone> Service<infra::Postgres, M> {
    /// Returns a copy of this [`Service`] owning its own [`infra::Postgres`]
    /// connection slot.
    ///
    /// The pooled connection is acquired on the first [`Database`] operation
    /// and returned to the pool once the copy and all its clones are dropped.
    #[must_use]
    pub fn scoped(&self) -> Self {
        Self {
            config: self.config.clone(),
            database: self.database.scoped(),
            mailer: self.mailer.clone(),
        }
    }
}
