//! [`Flash`] messages shown once on the next rendered page.

use serde::{Deserialize, Serialize};

/// One-time message shown to a user on the next rendered page.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Flash {
    /// [`Category`] of this [`Flash`].
    pub category: Category,

    /// Text of this [`Flash`].
    pub message: String,
}

impl Flash {
    /// Creates a new [`Category::Success`] [`Flash`].
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: Category::Success,
            message: message.into(),
        }
    }

    /// Creates a new [`Category::Info`] [`Flash`].
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            category: Category::Info,
            message: message.into(),
        }
    }

    /// Creates a new [`Category::Error`] [`Flash`].
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: Category::Error,
            message: message.into(),
        }
    }

    /// Encodes the provided [`Flash`]es into a cookie value.
    #[must_use]
    pub fn encode(flashes: &[Self]) -> String {
        serde_json::to_string(flashes).unwrap_or_default()
    }

    /// Decodes [`Flash`]es out of the provided cookie value.
    ///
    /// Malformed values decode into no [`Flash`]es.
    #[must_use]
    pub fn decode(value: &str) -> Vec<Self> {
        serde_json::from_str(value).unwrap_or_default()
    }
}

/// Category of a [`Flash`], used for styling.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Completed action.
    Success,

    /// Neutral notice.
    Info,

    /// Failed action.
    Error,
}

#[cfg(test)]
mod spec {
    use super::Flash;

    #[test]
    fn survives_cookie_encoding() {
        let flashes = vec![
            Flash::success("You have successfully logged in."),
            Flash::error("Invalid email or password."),
        ];

        let value = Flash::encode(&flashes);

        assert_eq!(
            value,
            r#"[{"category":"success","message":"You have successfully logged in."},{"category":"error","message":"Invalid email or password."}]"#,
        );
        assert_eq!(Flash::decode(&value), flashes);
    }

    #[test]
    fn malformed_cookie_has_no_flashes() {
        assert!(Flash::decode("").is_empty());
        assert!(Flash::decode("not json").is_empty());
        assert!(Flash::decode(r#"[{"category":"shout"}]"#).is_empty());
    }
}
