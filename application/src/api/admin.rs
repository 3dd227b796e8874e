//! User administration endpoints.

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path,
    },
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::{json, Value};
use service::{
    command::{self, Command as _},
    domain::{user, User},
    query,
};

use crate::{define_error, AsError, Context, Error, Flash};

/// Page listing all the [`User`]s.
pub async fn users(ctx: Context) -> Response {
    match list(&ctx).await {
        Ok(data) => ctx.render("admin_users.html", data),
        Err(e) => ctx.fail(e, "/dashboard"),
    }
}

async fn list(ctx: &Context) -> Result<Value, Error> {
    _ = ctx.require_admin().await?;

    let users = ctx
        .service()
        .execute(query::users::List::by(()))
        .await
        .map_err(AsError::into_error)?;
    let pending = ctx
        .service()
        .execute(query::users::PendingCount::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(json!({
        "users": users.iter().map(super::user_json).collect::<Vec<_>>(),
        "pending_users": *pending,
    }))
}

/// Names of all the [`User`]s.
pub async fn names(ctx: Context) -> Response {
    match list_names(&ctx).await {
        Ok(names) => ctx.json(names),
        Err(e) => ctx.fail_json(e),
    }
}

async fn list_names(ctx: &Context) -> Result<Value, Error> {
    _ = ctx.require_admin().await?;

    let users = ctx
        .service()
        .execute(query::users::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(names_json(users.iter().map(|u| &u.name)))
}

/// Renders the provided [`user::Name`]s as a JSON array.
fn names_json<'n>(names: impl IntoIterator<Item = &'n user::Name>) -> Value {
    names.into_iter().map(ToString::to_string).collect()
}

/// Number of [`User`]s awaiting being granted access.
pub async fn pending_count(ctx: Context) -> Response {
    match count_pending(&ctx).await {
        Ok(count) => ctx.json(json!({ "pending_users": count })),
        Err(e) => ctx.fail_json(e),
    }
}

async fn count_pending(ctx: &Context) -> Result<u64, Error> {
    _ = ctx.require_admin().await?;

    ctx.service()
        .execute(query::users::PendingCount::by(()))
        .await
        .map(|count| *count)
        .map_err(AsError::into_error)
}

/// Page with the form editing a [`User`].
pub async fn edit_page(
    ctx: Context,
    path: Result<Path<i32>, PathRejection>,
) -> Response {
    match find(&ctx, path).await {
        Ok(user) => {
            let data = json!({ "user": super::user_json(&user) });
            ctx.render("edit_user.html", data)
        }
        Err(e) => ctx.fail(e, "/admin_users"),
    }
}

/// Submitted form editing a [`User`].
#[derive(Debug, Deserialize)]
pub struct EditForm {
    /// New name of the [`User`].
    #[serde(default)]
    name: String,

    /// New surname of the [`User`].
    #[serde(default)]
    surname: String,

    /// New email of the [`User`].
    #[serde(default)]
    email: String,

    /// Checkbox granting access to the catalog.
    has_access: Option<String>,

    /// Checkbox granting administrator privileges.
    is_admin: Option<String>,
}

/// Updates a [`User`] with the submitted form.
pub async fn edit(
    mut ctx: Context,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Form<EditForm>, FormRejection>,
) -> Response {
    match update(&ctx, path, form).await {
        Ok(()) => {
            ctx.flash(Flash::success("User updated successfully."));
            ctx.redirect("/admin_users")
        }
        Err(e) => ctx.fail(e, "/admin_users"),
    }
}

async fn update(
    ctx: &Context,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Form<EditForm>, FormRejection>,
) -> Result<(), Error> {
    _ = ctx.require_admin().await?;
    let user_id = user_id(path)?;
    let Form(EditForm {
        name,
        surname,
        email,
        has_access,
        is_admin,
    }) = form.map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(command::UpdateUser {
            user_id,
            name: super::name(&name)?,
            surname: super::name(&surname)?,
            email: super::email(&email)?,
            has_access: has_access.is_some(),
            is_admin: is_admin.is_some(),
        })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!(
        "`User({})` updated: has_access={}, is_admin={}",
        user.id,
        user.has_access,
        user.is_admin,
    );

    Ok(())
}

/// Page confirming deletion of a [`User`].
pub async fn delete_page(
    ctx: Context,
    path: Result<Path<i32>, PathRejection>,
) -> Response {
    match find(&ctx, path).await {
        Ok(user) => {
            let data = json!({ "user": super::user_json(&user) });
            ctx.render("delete_user.html", data)
        }
        Err(e) => ctx.fail(e, "/admin_users"),
    }
}

/// Deletes a [`User`].
pub async fn delete(
    mut ctx: Context,
    path: Result<Path<i32>, PathRejection>,
) -> Response {
    match remove(&ctx, path).await {
        Ok(()) => {
            ctx.flash(Flash::success("User deleted successfully."));
            ctx.redirect("/admin_users")
        }
        Err(e) => ctx.fail(e, "/admin_users"),
    }
}

async fn remove(
    ctx: &Context,
    path: Result<Path<i32>, PathRejection>,
) -> Result<(), Error> {
    let admin_id = ctx.require_admin().await?.id;
    let user_id = user_id(path)?;
    if user_id == admin_id {
        return Err(AdminError::SelfDeletion.into());
    }

    let user = ctx
        .service()
        .execute(command::DeleteUser { user_id })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("`User({})` deleted", user.id);

    Ok(())
}

/// Finds the [`User`] identified by the request path.
async fn find(
    ctx: &Context,
    path: Result<Path<i32>, PathRejection>,
) -> Result<User, Error> {
    _ = ctx.require_admin().await?;
    let id = user_id(path)?;

    ctx.service()
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| AdminError::UserNotExists.into())
}

/// Extracts a [`user::Id`] out of the request path.
fn user_id(path: Result<Path<i32>, PathRejection>) -> Result<user::Id, Error> {
    let Path(id) = path.map_err(AsError::into_error)?;
    Ok(id.into())
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(AdminError::EmailOccupied.into()),
            Self::UserNotExists(_) => Some(AdminError::UserNotExists.into()),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(AdminError::UserNotExists.into()),
        }
    }
}

define_error! {
    enum AdminError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "User does not exist."]
        UserNotExists,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "User with this email already exists."]
        EmailOccupied,

        #[code = "SELF_DELETION"]
        #[status = BAD_REQUEST]
        #[message = "You cannot delete your own account."]
        SelfDeletion,
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;
    use service::domain::user;

    use super::names_json;

    #[test]
    fn lists_names_in_order() {
        let names = ["Anna", "Ben"].map(|n| user::Name::new(n).unwrap());

        assert_eq!(names_json(&names), json!(["Anna", "Ben"]));
        assert_eq!(names_json([]), json!([]));
    }
}
