//! [`PasswordReset`] definitions.

use std::time::Duration;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, FromStr};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;

/// Pending request of a [`User`] to reset the forgotten password.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PasswordReset {
    /// [`Token`] emailed to the [`User`].
    pub token: Token,

    /// [`DateTime`] when the [`Token`] was issued.
    pub issued_at: IssuingDateTime,
}

impl PasswordReset {
    /// Issues a new [`PasswordReset`] with a random [`Token`].
    #[must_use]
    pub fn issue() -> Self {
        Self {
            token: Token::new(),
            issued_at: IssuingDateTime::now(),
        }
    }

    /// Indicates whether this [`PasswordReset`] is older than the provided
    /// `ttl` at the `now` moment.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: IssuingDateTime) -> bool {
        self.issued_at.elapsed_until(now) > ttl
    }
}

/// Random token of a [`PasswordReset`].
#[derive(Clone, Copy, Debug, Display, Eq, FromStr, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Token(Uuid);

impl Token {
    /// Generates a new random [`Token`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

/// [`DateTime`] when a [`PasswordReset`] was issued.
pub type IssuingDateTime = DateTimeOf<(PasswordReset, unit::Issuing)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{IssuingDateTime, PasswordReset, Token};

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[test]
    fn expires_after_ttl() {
        let issued_at = IssuingDateTime::from_unix_timestamp(1_700_000_000)
            .unwrap();
        let reset = PasswordReset {
            token: Token::new(),
            issued_at,
        };

        assert!(!reset.is_expired(HOUR, issued_at));
        assert!(!reset.is_expired(HOUR, issued_at + HOUR));
        assert!(reset.is_expired(HOUR, issued_at + HOUR + Duration::from_secs(1)));
    }

    #[test]
    fn freshly_issued_is_not_expired() {
        let reset = PasswordReset::issue();

        assert!(!reset.is_expired(HOUR, IssuingDateTime::now()));
    }

    #[test]
    fn tokens_are_unique_and_parseable() {
        let token = Token::new();

        assert_ne!(token, Token::new());
        assert_eq!(token.to_string().parse::<Token>().unwrap(), token);
        assert!("definitely-not-a-token".parse::<Token>().is_err());
    }
}
