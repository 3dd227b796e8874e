//! [`Context`]-related definitions.

use axum::{
    async_trait,
    extract::FromRequestParts,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use derive_more::Debug;
use service::{
    command::{self, Command as _},
    domain::{user::session, User},
};
use sha2::{Digest as _, Sha512};
use tokio::sync::OnceCell;

use crate::{define_error, AsError, Error, Flash, Service, View};

/// Name of the cookie holding the [`session::Token`].
pub const SESSION_COOKIE: &str = "session";

/// Name of the cookie holding the pending [`Flash`]es.
pub const FLASH_COOKIE: &str = "flash";

/// Derives the [`Key`] encrypting the cookies out of the provided `secret`.
#[must_use]
pub fn cookie_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

/// Context of a single HTTP request.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance scoped to the request.
    service: Service,

    /// Encrypted cookies of the request, along with the ones to be set by
    /// the response.
    #[debug(skip)]
    jar: PrivateCookieJar,

    /// [`User`] owning the current session, if any.
    current_user: OnceCell<Option<User>>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the signed in [`User`], if any.
    ///
    /// Invalid or expired sessions are treated as absent ones.
    ///
    /// # Errors
    ///
    /// If the session cannot be authorized.
    pub async fn current_user(&self) -> Result<Option<&User>, Error> {
        self.current_user
            .get_or_try_init(|| self.authenticate())
            .await
            .map(Option::as_ref)
    }

    /// Returns the signed in [`User`].
    ///
    /// # Errors
    ///
    /// With [`AuthError::LoginRequired`] if no [`User`] is signed in.
    pub async fn require_user(&self) -> Result<&User, Error> {
        self.current_user()
            .await?
            .ok_or_else(|| AuthError::LoginRequired.into())
    }

    /// Returns the signed in [`User`] allowed to browse the catalog.
    ///
    /// # Errors
    ///
    /// With [`AuthError::AccessPending`] if the [`User`] has not been granted
    /// access yet.
    pub async fn require_access(&self) -> Result<&User, Error> {
        let user = self.require_user().await?;
        if user.can_browse() {
            Ok(user)
        } else {
            Err(AuthError::AccessPending.into())
        }
    }

    /// Returns the signed in administrator [`User`].
    ///
    /// # Errors
    ///
    /// With [`AuthError::AdminRequired`] if the [`User`] is not an
    /// administrator.
    pub async fn require_admin(&self) -> Result<&User, Error> {
        let user = self.require_user().await?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(AuthError::AdminRequired.into())
        }
    }

    /// Starts a new session identified by the provided [`session::Token`].
    pub fn sign_in(
        &mut self,
        token: &session::Token,
        expires_at: session::ExpirationDateTime,
    ) {
        let mut cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        let timestamp = expires_at.unix_timestamp();
        if let Ok(at) = time::OffsetDateTime::from_unix_timestamp(timestamp) {
            cookie = cookie.expires(at);
        }
        self.jar = self.jar.clone().add(cookie);
    }

    /// Ends the current session, if any.
    pub fn sign_out(&mut self) {
        self.jar = self
            .jar
            .clone()
            .remove(Cookie::build(SESSION_COOKIE).path("/"));
    }

    /// Adds the provided [`Flash`] to be shown on the next rendered page.
    pub fn flash(&mut self, flash: Flash) {
        let mut flashes = self
            .jar
            .get(FLASH_COOKIE)
            .map(|c| Flash::decode(c.value()))
            .unwrap_or_default();
        flashes.push(flash);

        self.jar = self.jar.clone().add(
            Cookie::build((FLASH_COOKIE, Flash::encode(&flashes)))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        );
    }

    /// Takes all the pending [`Flash`]es.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        let Some(cookie) = self.jar.get(FLASH_COOKIE) else {
            return Vec::new();
        };
        self.jar = self
            .jar
            .clone()
            .remove(Cookie::build(FLASH_COOKIE).path("/"));
        Flash::decode(cookie.value())
    }

    /// Finishes the request with a redirect to the provided location.
    #[must_use]
    pub fn redirect(self, to: &str) -> Response {
        (self.jar, Redirect::to(to)).into_response()
    }

    /// Finishes the request with the [`View`] of the provided `template`,
    /// consuming the pending [`Flash`]es.
    #[must_use]
    pub fn render(
        mut self,
        template: &'static str,
        data: serde_json::Value,
    ) -> Response {
        let flashes = self.take_flashes();
        let view = View {
            template,
            flashes,
            data,
        };
        (self.jar, view).into_response()
    }

    /// Finishes the request with the provided JSON `body`.
    #[must_use]
    pub fn json(self, body: serde_json::Value) -> Response {
        (self.jar, Json(body)).into_response()
    }

    /// Finishes the request with the provided [`Error`] flashed, redirecting
    /// to the given location.
    ///
    /// Authorization [`Error`]s redirect to the page able to resolve them
    /// instead.
    #[must_use]
    pub fn fail(mut self, err: Error, to: &str) -> Response {
        err.log();
        self.flash(Flash::error(err.user_message()));
        let to = AuthError::redirect_for(&err).unwrap_or(to);
        self.redirect(to)
    }

    /// Finishes the request with the provided [`Error`] as a JSON body.
    #[must_use]
    pub fn fail_json(self, err: Error) -> Response {
        (self.jar, err).into_response()
    }

    /// Authorizes the session stored in the cookies, if any.
    async fn authenticate(&self) -> Result<Option<User>, Error> {
        let Some(token) = self
            .jar
            .get(SESSION_COOKIE)
            .and_then(|c| c.value().parse::<session::Token>().ok())
        else {
            return Ok(None);
        };

        match self
            .service
            .execute(command::AuthorizeUserSession { token })
            .await
        {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                let err = e.into_error();
                if err.code == Error::from(AuthError::LoginRequired).code {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .map(Service::scoped)
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;
        let key = parts
            .extensions
            .get::<Key>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing cookie `Key` extension"))?;

        Ok(Self {
            service,
            jar: PrivateCookieJar::from_headers(&parts.headers, key),
            current_user: OnceCell::new(),
        })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::LoginRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "LOGIN_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "You need to login first."]
        LoginRequired,

        #[code = "ACCESS_PENDING"]
        #[status = FORBIDDEN]
        #[message = "Your account is awaiting approval by an administrator."]
        AccessPending,

        #[code = "ADMIN_REQUIRED"]
        #[status = FORBIDDEN]
        #[message = "Administrator privileges are required."]
        AdminRequired,
    }
}

impl AuthError {
    /// Returns the location resolving the provided authorization [`Error`],
    /// if it's the one.
    fn redirect_for(err: &Error) -> Option<&'static str> {
        [
            (Self::LoginRequired, "/login"),
            (Self::AccessPending, "/"),
            (Self::AdminRequired, "/dashboard"),
        ]
        .into_iter()
        .find_map(|(e, to)| (Error::from(e).code == err.code).then_some(to))
    }
}

#[cfg(test)]
mod spec {
    use crate::Error;

    use super::{cookie_key, AuthError};

    #[test]
    fn cookie_key_is_derived_deterministically() {
        let key = cookie_key("secret");

        assert_eq!(key.master(), cookie_key("secret").master());
        assert_ne!(key.master(), cookie_key("other").master());
    }

    #[test]
    fn auth_errors_redirect_to_resolving_pages() {
        assert_eq!(
            AuthError::redirect_for(&AuthError::LoginRequired.into()),
            Some("/login"),
        );
        assert_eq!(
            AuthError::redirect_for(&AuthError::AccessPending.into()),
            Some("/"),
        );
        assert_eq!(
            AuthError::redirect_for(&AuthError::AdminRequired.into()),
            Some("/dashboard"),
        );
        assert_eq!(AuthError::redirect_for(&Error::internal(&"boom")), None);
    }
}
