//! HTTP API definitions.

pub mod account;
pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod mail;
pub mod password;
pub mod property;

use std::{path::Path, str::FromStr};

use axum::{
    routing::{get, post},
    Router,
};
use secrecy::SecretBox;
use serde_json::{json, Value};
use service::domain::{user, User};
use tower_http::services::ServeDir;

use crate::{define_error, Error};

/// Raw `(name, value)` pairs of a submitted form.
pub type Params = Vec<(String, String)>;

/// Builds the [`Router`] of all the HTTP routes.
///
/// Unknown paths are served from the provided `templates_dir`.
pub fn router(templates_dir: &Path) -> Router {
    Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/login.html", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/register.html", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/logout.html", get(auth::logout))
        .route("/dashboard", get(dashboard::page).post(dashboard::list))
        .route("/dashboard.html", get(dashboard::page))
        .route("/view_property/:id", get(property::view))
        .route("/update_property/:id", post(property::update))
        .route("/delete_property/:id", post(property::delete))
        .route("/add_property", get(property::add_page).post(property::add))
        .route("/admin_users", get(admin::users))
        .route(
            "/admin/users/:id/edit",
            get(admin::edit_page).post(admin::edit),
        )
        .route(
            "/admin/users/:id/delete",
            get(admin::delete_page).post(admin::delete),
        )
        .route("/users", get(admin::names))
        .route("/get_pending_users_count", get(admin::pending_count))
        .route("/send_email", post(mail::send_selected))
        .route("/contact", get(mail::contact_page).post(mail::contact))
        .route("/report", get(mail::report_page).post(mail::report))
        .route(
            "/change_password",
            get(account::password_page).post(account::change_password),
        )
        .route(
            "/account_settings",
            get(account::settings_page).post(account::update_settings),
        )
        .route(
            "/forgot_password",
            get(password::forgot_page).post(password::forgot),
        )
        .route(
            "/reset_password",
            get(password::reset_page).post(password::reset),
        )
        .nest_service("/pages", ServeDir::new(templates_dir.join("pages")))
        .fallback_service(ServeDir::new(templates_dir))
}

/// Parses the provided form `value`, treating a blank one as absent.
///
/// # Errors
///
/// If the `value` is not blank and cannot be parsed.
fn optional<T: FromStr>(value: Option<&str>) -> Result<Option<T>, ()> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(drop),
    }
}

/// Parses the provided required form `value`.
///
/// # Errors
///
/// If the `value` is blank or cannot be parsed.
fn required<T: FromStr>(value: &str) -> Result<T, ()> {
    optional(Some(value))?.ok_or(())
}

/// Renders the public details of the provided [`User`].
fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name.to_string(),
        "surname": user.surname.to_string(),
        "email": user.email.to_string(),
        "joined_at": user.joined_at.to_rfc3339(),
        "has_access": user.has_access,
        "is_admin": user.is_admin,
    })
}

/// Parses a [`user::Name`] out of the provided form `value`.
fn name(value: &str) -> Result<user::Name, Error> {
    user::Name::new(value.trim()).ok_or_else(|| ValidationError::Name.into())
}

/// Parses a [`user::Email`] out of the provided form `value`.
fn email(value: &str) -> Result<user::Email, Error> {
    user::Email::new(value.trim()).ok_or_else(|| ValidationError::Email.into())
}

/// Parses a secret [`user::Password`] out of the provided form `value`.
fn password(value: String) -> Result<SecretBox<user::Password>, Error> {
    user::Password::new(value)
        .map(|p| SecretBox::new(Box::new(p)))
        .ok_or_else(|| ValidationError::Password.into())
}

define_error! {
    enum ValidationError {
        #[code = "INVALID_NAME"]
        #[status = BAD_REQUEST]
        #[message = "Name must be 1 to 100 characters long."]
        Name,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Please provide a valid email address."]
        Email,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Password must be 6 to 128 characters long."]
        Password,

        #[code = "EMPTY_MESSAGE"]
        #[status = BAD_REQUEST]
        #[message = "Please fill in all the fields."]
        EmptyMessage,
    }
}

#[cfg(test)]
mod spec {
    use secrecy::ExposeSecret as _;

    use super::{email, name, optional, password, required};

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(optional::<i32>(None), Ok(None));
        assert_eq!(optional::<i32>(Some("")), Ok(None));
        assert_eq!(optional::<i32>(Some("  ")), Ok(None));
        assert_eq!(optional::<i32>(Some(" 3 ")), Ok(Some(3)));
        assert_eq!(optional::<i32>(Some("three")), Err(()));
    }

    #[test]
    fn required_values_must_be_present() {
        assert_eq!(required::<i32>("7"), Ok(7));
        assert_eq!(required::<i32>(""), Err(()));
        assert_eq!(required::<i32>("x"), Err(()));
    }

    #[test]
    fn trims_user_fields() {
        assert_eq!(name(" Jane ").unwrap().to_string(), "Jane");
        assert_eq!(
            email(" jane@example.com").unwrap().to_string(),
            "jane@example.com",
        );
        assert!(name("  ").is_err());
        assert!(email("jane").is_err());
    }

    #[test]
    fn checks_password_length() {
        assert!(password("12345".into()).is_err());
        assert_eq!(
            password("123456".into()).unwrap().expose_secret(),
            &service::domain::user::Password::new("123456").unwrap(),
        );
    }
}
