//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_admin_user;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod delete_property;
pub mod delete_user;
pub mod export_properties;
pub mod report_issue;
pub mod request_password_reset;
pub mod reset_password;
pub mod send_contact_message;
pub mod update_account_settings;
pub mod update_property;
pub mod update_user;
pub mod update_user_password;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_admin_user::CreateAdminUser, create_property::CreateProperty,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_property::DeleteProperty, delete_user::DeleteUser,
    export_properties::ExportProperties, report_issue::ReportIssue,
    request_password_reset::RequestPasswordReset,
    reset_password::ResetPassword, send_contact_message::SendContactMessage,
    update_account_settings::UpdateAccountSettings,
    update_property::UpdateProperty, update_user::UpdateUser,
    update_user_password::UpdateUserPassword,
};
