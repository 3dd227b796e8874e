//! Password recovery endpoints.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query,
    },
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::user::password_reset,
};

use crate::{define_error, AsError, Context, Error, Flash};

/// Page with the form requesting a password reset.
pub async fn forgot_page(ctx: Context) -> Response {
    ctx.render("forgot_password.html", json!({}))
}

/// Submitted form requesting a password reset.
#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    /// Email of the account to recover.
    #[serde(default)]
    email: String,
}

/// Emails a password reset link, if the account exists.
pub async fn forgot(
    mut ctx: Context,
    form: Result<Form<ForgotForm>, FormRejection>,
) -> Response {
    match request(&ctx, form).await {
        Ok(()) => {
            ctx.flash(Flash::info(
                "If an account with that email exists, a password reset link \
                 has been sent to it.",
            ));
            ctx.redirect("/login")
        }
        Err(e) => ctx.fail(e, "/forgot_password"),
    }
}

async fn request(
    ctx: &Context,
    form: Result<Form<ForgotForm>, FormRejection>,
) -> Result<(), Error> {
    let Form(ForgotForm { email }) = form.map_err(AsError::into_error)?;

    ctx.service()
        .execute(command::RequestPasswordReset {
            email: super::email(&email)?,
        })
        .await
        .map_err(AsError::into_error)
}

/// Query string of the password reset link.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    /// Raw [`password_reset::Token`].
    token: Option<String>,
}

/// Page with the form choosing a new password.
pub async fn reset_page(
    ctx: Context,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Response {
    let token = query
        .ok()
        .and_then(|Query(q)| q.token)
        .as_deref()
        .and_then(parse_token);
    match token {
        Some(token) => {
            let data = json!({ "token": token.to_string() });
            ctx.render("reset_password.html", data)
        }
        None => ctx.fail(ResetError::InvalidToken.into(), "/forgot_password"),
    }
}

/// Parses a [`password_reset::Token`] out of its raw form.
fn parse_token(raw: &str) -> Option<password_reset::Token> {
    raw.trim().parse().ok()
}

/// Submitted form choosing a new password.
#[derive(Debug, Deserialize)]
pub struct ResetForm {
    /// Raw [`password_reset::Token`], if not passed in the query string.
    token: Option<String>,

    /// New password.
    #[serde(default)]
    new_password: String,

    /// New password repeated.
    #[serde(default)]
    confirm_password: String,
}

/// Sets a new password by consuming the [`password_reset::Token`].
pub async fn reset(
    mut ctx: Context,
    query: Result<Query<TokenQuery>, QueryRejection>,
    form: Result<Form<ResetForm>, FormRejection>,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let form = form.map(|Form(f)| f).map_err(AsError::into_error);
    let raw = query.token.or_else(|| {
        form.as_ref().ok().and_then(|f| f.token.clone())
    });
    let back = raw.as_ref().map_or_else(
        || "/forgot_password".to_owned(),
        |t| format!("/reset_password?token={}", t.trim()),
    );

    match consume(&ctx, raw.as_deref(), form).await {
        Ok(()) => {
            ctx.flash(Flash::success(
                "Your password has been reset. You can now log in.",
            ));
            ctx.redirect("/login")
        }
        Err(e) => {
            let to = ResetError::redirect_for(&e).unwrap_or(back.as_str());
            ctx.fail(e, to)
        }
    }
}

async fn consume(
    ctx: &Context,
    raw: Option<&str>,
    form: Result<ResetForm, Error>,
) -> Result<(), Error> {
    let token = raw.and_then(parse_token).ok_or(ResetError::InvalidToken)?;
    let ResetForm {
        token: _,
        new_password,
        confirm_password,
    } = form?;

    let user = ctx
        .service()
        .execute(command::ResetPassword {
            token,
            new_password: super::password(new_password)?,
            confirmation: super::password(confirm_password)?,
        })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("`User({})` has reset the password", user.id);

    Ok(())
}

impl AsError for command::request_password_reset::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Mailer(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::reset_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ConfirmationMismatch => {
                Some(ResetError::ConfirmationMismatch.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::Hashing(_) => None,
            Self::InvalidToken => Some(ResetError::InvalidToken.into()),
            Self::TokenExpired => Some(ResetError::TokenExpired.into()),
        }
    }
}

define_error! {
    enum ResetError {
        #[code = "INVALID_RESET_TOKEN"]
        #[status = BAD_REQUEST]
        #[message = "Password reset link is invalid or has been used already."]
        InvalidToken,

        #[code = "EXPIRED_RESET_TOKEN"]
        #[status = BAD_REQUEST]
        #[message = "Password reset link has expired, request a new one."]
        TokenExpired,

        #[code = "PASSWORD_MISMATCH"]
        #[status = BAD_REQUEST]
        #[message = "New password and its confirmation do not match."]
        ConfirmationMismatch,
    }
}

impl ResetError {
    /// Returns the location to request a new token from, if the provided
    /// [`Error`] makes the current one unusable.
    fn redirect_for(err: &Error) -> Option<&'static str> {
        [Self::InvalidToken, Self::TokenExpired]
            .into_iter()
            .any(|e| Error::from(e).code == err.code)
            .then_some("/forgot_password")
    }
}

#[cfg(test)]
mod spec {
    use crate::Error;

    use super::{parse_token, ResetError};

    #[test]
    fn parses_tokens_leniently() {
        let raw = "67e55044-10b1-426f-9247-bb680e5fe0c8";

        assert_eq!(
            parse_token(&format!(" {raw} ")).map(|t| t.to_string()),
            Some(raw.to_owned()),
        );
        assert_eq!(parse_token("1"), None);
        assert_eq!(parse_token(""), None);
    }

    #[test]
    fn unusable_tokens_lead_to_new_request() {
        assert_eq!(
            ResetError::redirect_for(&ResetError::TokenExpired.into()),
            Some("/forgot_password"),
        );
        assert_eq!(
            ResetError::redirect_for(&ResetError::InvalidToken.into()),
            Some("/forgot_password"),
        );
        assert_eq!(
            ResetError::redirect_for(&ResetError::ConfirmationMismatch.into()),
            None,
        );
        assert_eq!(ResetError::redirect_for(&Error::internal(&"boom")), None);
    }
}
