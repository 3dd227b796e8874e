//! [`User`] read model definitions.

use derive_more::{Deref, From, Into};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Total count of [`User`]s.
#[derive(Clone, Copy, Debug, Deref, Eq, From, Hash, Into, PartialEq)]
pub struct TotalCount(u64);

/// Count of [`User`]s awaiting being granted access.
#[derive(Clone, Copy, Debug, Deref, Eq, From, Hash, Into, PartialEq)]
pub struct PendingCount(u64);

/// [`user::Email`]s of all the administrator [`User`]s.
#[derive(Clone, Debug, Default, Deref, Eq, From, Into, PartialEq)]
pub struct AdminEmails(Vec<user::Email>);
