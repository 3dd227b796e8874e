//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::By;

use crate::{domain::User, read};
#[cfg(doc)]
use crate::{domain::user, Query};

use super::DatabaseQuery;

/// Queries all the [`User`]s ordered by their [`user::Id`]s.
pub type List = DatabaseQuery<By<Vec<User>, ()>>;

/// Queries count of [`User`]s awaiting being granted access.
pub type PendingCount = DatabaseQuery<By<read::user::PendingCount, ()>>;
