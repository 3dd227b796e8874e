//! Endpoints emailing administrators or the current user.

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    response::Response,
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use service::{
    command::{self, Command as _},
    domain::property,
};

use crate::{define_error, AsError, AuthError, Context, Error, Flash};

use super::ValidationError;

/// Property selected on the dashboard.
#[derive(Debug, Deserialize)]
pub struct Selected {
    /// ID of the property, either as a number or a string.
    id: RawId,
}

/// ID as submitted by the dashboard script.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    /// Numeric ID.
    Number(i32),

    /// Textual ID.
    Text(String),
}

impl RawId {
    /// Parses this [`RawId`] into a [`property::Id`], if it's a valid one.
    fn parse(&self) -> Option<property::Id> {
        match self {
            Self::Number(n) => Some((*n).into()),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Emails the selected properties to the current user.
pub async fn send_selected(
    ctx: Context,
    body: Result<Json<Vec<Selected>>, JsonRejection>,
) -> Response {
    match export(&ctx, body).await {
        Ok(email) => ctx.json(exported(&email)),
        Err(e) => ctx.fail_json(e),
    }
}

async fn export(
    ctx: &Context,
    body: Result<Json<Vec<Selected>>, JsonRejection>,
) -> Result<String, Error> {
    let user_id = ctx.require_access().await?.id;
    let Json(selected) = body.map_err(AsError::into_error)?;

    let property_ids = selected.iter().filter_map(|s| s.id.parse()).collect();

    let email = ctx
        .service()
        .execute(command::ExportProperties {
            user_id,
            property_ids,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(email.to_string())
}

/// Payload reporting the properties emailed to the provided address.
fn exported(email: &str) -> serde_json::Value {
    json!({ "message": "success", "email": email })
}

/// Contact page.
pub async fn contact_page(ctx: Context) -> Response {
    match ctx.require_user().await {
        Ok(_) => ctx.render("contact.html", json!({})),
        Err(e) => ctx.fail(e, "/login"),
    }
}

/// Submitted contact form.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    /// Name of the sender.
    #[serde(default)]
    name: String,

    /// Email to reply to.
    #[serde(default)]
    email: String,

    /// Text of the message.
    #[serde(default)]
    message: String,
}

/// Forwards the contact message to the administrators.
pub async fn contact(
    mut ctx: Context,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Response {
    match forward_message(&ctx, form).await {
        Ok(()) => {
            ctx.flash(Flash::success("Your message has been sent."));
            ctx.redirect("/contact")
        }
        Err(e) => ctx.fail(e, "/contact"),
    }
}

async fn forward_message(
    ctx: &Context,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Result<(), Error> {
    _ = ctx.require_user().await?;
    let Form(ContactForm {
        name,
        email,
        message,
    }) = form.map_err(AsError::into_error)?;
    let (name, message) = (name.trim(), message.trim());
    if name.is_empty() || message.is_empty() {
        return Err(ValidationError::EmptyMessage.into());
    }

    ctx.service()
        .execute(command::SendContactMessage {
            name: name.to_owned(),
            email: super::email(&email)?,
            message: message.to_owned(),
        })
        .await
        .map_err(AsError::into_error)
}

/// Issue report page.
pub async fn report_page(ctx: Context) -> Response {
    match ctx.require_user().await {
        Ok(_) => ctx.render("report.html", json!({})),
        Err(e) => ctx.fail(e, "/login"),
    }
}

/// Submitted issue report form.
#[derive(Debug, Deserialize)]
pub struct ReportForm {
    /// Short summary of the issue.
    #[serde(default)]
    subject: String,

    /// Details of the issue.
    #[serde(default)]
    description: String,
}

/// Forwards the issue report to the administrators.
pub async fn report(
    mut ctx: Context,
    form: Result<Form<ReportForm>, FormRejection>,
) -> Response {
    match forward_report(&ctx, form).await {
        Ok(()) => {
            ctx.flash(Flash::success("Your report has been sent."));
            ctx.redirect("/report")
        }
        Err(e) => ctx.fail(e, "/report"),
    }
}

async fn forward_report(
    ctx: &Context,
    form: Result<Form<ReportForm>, FormRejection>,
) -> Result<(), Error> {
    let user_id = ctx.require_user().await?.id;
    let Form(ReportForm {
        subject,
        description,
    }) = form.map_err(AsError::into_error)?;
    let (subject, description) = (subject.trim(), description.trim());
    if subject.is_empty() || description.is_empty() {
        return Err(ValidationError::EmptyMessage.into());
    }

    ctx.service()
        .execute(command::ReportIssue {
            user_id,
            subject: subject.to_owned(),
            description: description.to_owned(),
        })
        .await
        .map_err(AsError::into_error)
}

impl AsError for command::export_properties::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Mailer(e) => e.try_as_error(),
            Self::NothingSelected => {
                Some(DeliveryError::NothingSelected.into())
            }
            Self::UserNotExists(_) => Some(AuthError::LoginRequired.into()),
        }
    }
}

impl AsError for command::send_contact_message::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Mailer(e) => e.try_as_error(),
            Self::NoAdmins => Some(DeliveryError::NoAdmins.into()),
        }
    }
}

impl AsError for command::report_issue::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Mailer(e) => e.try_as_error(),
            Self::NoAdmins => Some(DeliveryError::NoAdmins.into()),
            Self::UserNotExists(_) => Some(AuthError::LoginRequired.into()),
        }
    }
}

define_error! {
    enum DeliveryError {
        #[code = "NOTHING_SELECTED"]
        #[status = BAD_REQUEST]
        #[message = "Please select at least one property."]
        NothingSelected,

        #[code = "NO_ADMINS"]
        #[status = SERVICE_UNAVAILABLE]
        #[message = "There is no administrator to deliver the message to."]
        NoAdmins,
    }
}

#[cfg(test)]
mod spec {
    use service::domain::property;

    use serde_json::json;

    use super::{exported, Selected};

    #[test]
    fn accepts_numeric_and_textual_ids() {
        let selected: Vec<Selected> =
            serde_json::from_str(r#"[{"id": 1}, {"id": " 2 "}, {"id": "x"}]"#)
                .unwrap();

        let ids = selected
            .iter()
            .filter_map(|s| s.id.parse())
            .collect::<Vec<_>>();

        assert_eq!(
            ids,
            [property::Id::from(1_i32), property::Id::from(2_i32)],
        );
    }

    #[test]
    fn export_reports_success_with_recipient() {
        assert_eq!(
            exported("anna@example.com"),
            json!({ "message": "success", "email": "anna@example.com" }),
        );
    }
}
