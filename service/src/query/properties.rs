//! [`Query`] collection related to the multiple [`Property`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{
    domain::{property, Property},
    Query,
};

use super::DatabaseQuery;

/// Queries a filtered page of [`Property`]s.
pub type List = DatabaseQuery<
    By<read::property::list::Page, read::property::list::Selector>,
>;

/// Queries distinct [`property::Area`]s of all the [`Property`]s.
pub type Areas = DatabaseQuery<By<read::property::Areas, ()>>;
