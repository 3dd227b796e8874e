//! Registration and session endpoints.

use axum::{
    extract::rejection::FormRejection,
    response::{IntoResponse as _, Response},
    Form,
};
use secrecy::SecretBox;
use serde::Deserialize;
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::{user, User},
};

use crate::{define_error, AsError, Context, Error, Flash};

/// Landing page.
///
/// Redirects to the dashboard users able to browse it.
pub async fn index(ctx: Context) -> Response {
    let can_browse = ctx
        .current_user()
        .await
        .map(|user| user.is_some_and(User::can_browse));
    match can_browse {
        Ok(true) => ctx.redirect("/dashboard"),
        Ok(false) => ctx.render("index.html", json!({})),
        Err(e) => ctx.fail(e, "/login"),
    }
}

/// Login page.
pub async fn login_page(ctx: Context) -> Response {
    ctx.render("login.html", json!({}))
}

/// Submitted login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email of the [`User`].
    #[serde(default)]
    username: String,

    /// Password of the [`User`].
    #[serde(default)]
    password: String,
}

/// Signs the [`User`] in.
pub async fn login(
    mut ctx: Context,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    match sign_in(&mut ctx, form).await {
        Ok(()) => {
            ctx.flash(Flash::success("You have successfully logged in."));
            ctx.redirect("/dashboard")
        }
        Err(e) => ctx.fail(e, "/login"),
    }
}

async fn sign_in(
    ctx: &mut Context,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<(), Error> {
    let Form(LoginForm { username, password }) =
        form.map_err(AsError::into_error)?;
    let (Some(email), Some(password)) = (
        user::Email::new(username.trim()),
        user::Password::new(password),
    ) else {
        return Err(SessionError::WrongCredentials.into());
    };

    let session = ctx
        .service()
        .execute(command::CreateUserSession {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;
    ctx.sign_in(&session.token, session.expires_at);

    Ok(())
}

/// Registration page.
pub async fn register_page(ctx: Context) -> Response {
    ctx.render("register.html", json!({}))
}

/// Submitted registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// Name of the new [`User`].
    #[serde(default)]
    first_name: String,

    /// Surname of the new [`User`].
    #[serde(default)]
    last_name: String,

    /// Email of the new [`User`].
    #[serde(default)]
    email: String,

    /// Password of the new [`User`].
    #[serde(default)]
    password: String,
}

/// Registers a new [`User`] awaiting access.
pub async fn register(
    mut ctx: Context,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Response {
    match sign_up(&ctx, form).await {
        Ok(()) => {
            ctx.flash(Flash::success(
                "Registration successful. Your account is awaiting approval \
                 by an administrator.",
            ));
            ctx.redirect("/login")
        }
        Err(e) => ctx.fail(e, "/register"),
    }
}

async fn sign_up(
    ctx: &Context,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<(), Error> {
    let Form(RegisterForm {
        first_name,
        last_name,
        email,
        password,
    }) = form.map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            name: super::name(&first_name)?,
            surname: super::name(&last_name)?,
            email: super::email(&email)?,
            password: super::password(password)?,
        })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("`User({})` registered", user.id);

    Ok(())
}

/// Signs the current [`User`] out.
pub async fn logout(mut ctx: Context) -> Response {
    ctx.sign_out();
    ctx.flash(Flash::info("You have been logged out."));
    (
        [
            (
                http::header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate",
            ),
            (http::header::PRAGMA, "no-cache"),
            (http::header::EXPIRES, "0"),
        ],
        ctx.redirect("/login"),
    )
        .into_response()
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::WrongCredentials => {
                Some(SessionError::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(SessionError::EmailOccupied.into()),
            Self::Hashing(_) => None,
            Self::Mailer(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum SessionError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid email or password."]
        WrongCredentials,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "User with this email already exists."]
        EmailOccupied,
    }
}

#[cfg(test)]
mod spec {
    use service::{command::create_user, domain::user};

    use crate::{AsError as _, Error};

    use super::SessionError;

    #[test]
    fn occupied_email_is_user_facing() {
        let email = user::Email::new("jane@example.com").unwrap();
        let err = create_user::ExecutionError::EmailOccupied(email);

        let err = err.into_error();

        assert_eq!(err.code, Error::from(SessionError::EmailOccupied).code);
        assert_eq!(err.user_message(), "User with this email already exists.");
    }
}
