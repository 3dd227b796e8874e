//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{
            FormRejection, JsonRejection, PathRejection, QueryRejection,
        },
    },
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::infra::{database, mailer};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// User-facing [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// [`Code`] of an internal server [`Error`].
    pub const INTERNAL: Code = "INTERNAL_SERVER_ERROR";

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: Self::INTERNAL,
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Indicates whether this [`Error`] is an internal one, so its message
    /// is not meant to be shown to users.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.code == Self::INTERNAL
    }

    /// Returns the message of this [`Error`] to be shown to users.
    #[must_use]
    pub fn user_message(&self) -> &str {
        if self.is_internal() {
            "Something went wrong, please try again later."
        } else {
            &self.message
        }
    }

    /// Logs this [`Error`], if it's an [internal](Error::is_internal) one.
    pub fn log(&self) {
        if self.is_internal() {
            tracing::error!("{self}");
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        let body = serde_json::json!({
            "error": self.user_message(),
            "code": self.code,
        });
        (self.status_code, Json(body)).into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }

    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| {
            let mut error = Error::internal(&self);
            error.backtrace = Some(self.trace().clone());
            error
        })
    }
}

impl AsError for FormRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(RequestError::InvalidForm.into())
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(RequestError::InvalidJson.into())
    }
}

impl AsError for MultipartRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(RequestError::InvalidForm.into())
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        Some(RequestError::InvalidForm.into())
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(RequestError::InvalidPath.into())
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(RequestError::InvalidQuery.into())
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for mailer::Error {
    fn try_as_error(&self) -> Option<Error> {
        tracing::error!("failed to deliver email: {self}");
        Some(MailError::Undelivered.into())
    }
}

define_error! {
    enum RequestError {
        #[code = "INVALID_FORM"]
        #[status = BAD_REQUEST]
        #[message = "Submitted form is invalid."]
        InvalidForm,

        #[code = "INVALID_JSON"]
        #[status = BAD_REQUEST]
        #[message = "Submitted data is invalid."]
        InvalidJson,

        #[code = "INVALID_QUERY"]
        #[status = BAD_REQUEST]
        #[message = "Requested address is invalid."]
        InvalidQuery,

        #[code = "INVALID_PATH"]
        #[status = NOT_FOUND]
        #[message = "Requested page does not exist."]
        InvalidPath,
    }
}

define_error! {
    enum MailError {
        #[code = "MAIL_UNDELIVERED"]
        #[status = BAD_GATEWAY]
        #[message = "Failed to send the email, please try again later."]
        Undelivered,
    }
}

#[cfg(test)]
mod spec {
    use axum::{
        body::Body,
        extract::{FromRequest as _, Multipart},
    };

    use super::{AsError as _, Error, MailError, RequestError};

    #[test]
    fn hides_internal_messages() {
        let err = Error::internal(&"connection reset by peer");

        assert!(err.is_internal());
        assert_eq!(
            err.user_message(),
            "Something went wrong, please try again later.",
        );
        assert_eq!(
            err.to_string(),
            "[INTERNAL_SERVER_ERROR]: connection reset by peer",
        );
    }

    #[test]
    fn shows_user_facing_messages() {
        let err = Error::from(MailError::Undelivered);

        assert!(!err.is_internal());
        assert_eq!(err.status_code, http::StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.user_message(),
            "Failed to send the email, please try again later.",
        );
    }

    #[tokio::test]
    async fn malformed_multipart_is_invalid_form() {
        let req = http::Request::post("/dashboard")
            .header(http::header::CONTENT_TYPE, "text/plain")
            .body(Body::empty())
            .unwrap();

        let err = Multipart::from_request(req, &()).await.unwrap_err();

        assert_eq!(
            err.into_error().code,
            Error::from(RequestError::InvalidForm).code,
        );
    }
}
