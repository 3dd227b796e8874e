//! Own account endpoints.

use axum::{extract::rejection::FormRejection, response::Response, Form};
use secrecy::SecretBox;
use serde::Deserialize;
use serde_json::{json, Value};
use service::{
    command::{self, Command as _},
    domain::user,
};

use crate::{define_error, AsError, Context, Error, Flash};

/// Page with the form changing the password.
pub async fn password_page(ctx: Context) -> Response {
    match ctx.require_user().await {
        Ok(_) => ctx.render("change_password.html", json!({})),
        Err(e) => ctx.fail(e, "/login"),
    }
}

/// Submitted form changing the password.
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    /// Current password.
    #[serde(default)]
    old_password: String,

    /// New password.
    #[serde(default)]
    new_password: String,

    /// New password repeated.
    #[serde(default)]
    confirm_password: String,
}

/// Changes the password of the current user.
pub async fn change_password(
    mut ctx: Context,
    form: Result<Form<PasswordForm>, FormRejection>,
) -> Response {
    match update_password(&ctx, form).await {
        Ok(()) => {
            ctx.flash(Flash::success("Your password has been changed."));
            ctx.redirect("/dashboard")
        }
        Err(e) => ctx.fail(e, "/change_password"),
    }
}

async fn update_password(
    ctx: &Context,
    form: Result<Form<PasswordForm>, FormRejection>,
) -> Result<(), Error> {
    let user_id = ctx.require_user().await?.id;
    let Form(PasswordForm {
        old_password,
        new_password,
        confirm_password,
    }) = form.map_err(AsError::into_error)?;
    let old_password = user::Password::new(old_password)
        .ok_or(AccountError::WrongPassword)?;

    _ = ctx
        .service()
        .execute(command::UpdateUserPassword {
            user_id,
            old_password: SecretBox::new(Box::new(old_password)),
            new_password: super::password(new_password)?,
            confirmation: super::password(confirm_password)?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// Page with the form changing the account settings.
pub async fn settings_page(ctx: Context) -> Response {
    match settings(&ctx).await {
        Ok(data) => ctx.render("account_settings.html", data),
        Err(e) => ctx.fail(e, "/login"),
    }
}

async fn settings(ctx: &Context) -> Result<Value, Error> {
    let user = ctx.require_user().await?;
    Ok(json!({ "user": super::user_json(user) }))
}

/// Submitted form changing the account settings.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    /// New name.
    #[serde(default)]
    name: String,

    /// New surname.
    #[serde(default)]
    surname: String,

    /// New email.
    #[serde(default)]
    email: String,
}

/// Updates the account settings of the current user.
pub async fn update_settings(
    mut ctx: Context,
    form: Result<Form<SettingsForm>, FormRejection>,
) -> Response {
    match update_account(&ctx, form).await {
        Ok(()) => {
            ctx.flash(Flash::success("Your account settings have been saved."));
            ctx.redirect("/account_settings")
        }
        Err(e) => ctx.fail(e, "/account_settings"),
    }
}

async fn update_account(
    ctx: &Context,
    form: Result<Form<SettingsForm>, FormRejection>,
) -> Result<(), Error> {
    let user_id = ctx.require_user().await?.id;
    let Form(SettingsForm {
        name,
        surname,
        email,
    }) = form.map_err(AsError::into_error)?;

    _ = ctx
        .service()
        .execute(command::UpdateAccountSettings {
            user_id,
            name: super::name(&name)?,
            surname: super::name(&surname)?,
            email: super::email(&email)?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

impl AsError for command::update_user_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ConfirmationMismatch => {
                Some(AccountError::ConfirmationMismatch.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::Hashing(_) => None,
            Self::UserNotExists(_) => {
                Some(crate::AuthError::LoginRequired.into())
            }
            Self::WrongPassword => Some(AccountError::WrongPassword.into()),
        }
    }
}

impl AsError for command::update_account_settings::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(AccountError::EmailOccupied.into()),
            Self::UserNotExists(_) => {
                Some(crate::AuthError::LoginRequired.into())
            }
        }
    }
}

define_error! {
    enum AccountError {
        #[code = "WRONG_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Current password is incorrect."]
        WrongPassword,

        #[code = "PASSWORD_MISMATCH"]
        #[status = BAD_REQUEST]
        #[message = "New password and its confirmation do not match."]
        ConfirmationMismatch,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "User with this email already exists."]
        EmailOccupied,
    }
}
