//! [`View`] definitions.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::Flash;

/// Page handed to the presentation layer for rendering.
#[derive(Clone, Debug, Serialize)]
pub struct View {
    /// Name of the template rendering this [`View`].
    pub template: &'static str,

    /// [`Flash`]es to be shown on the page.
    pub flashes: Vec<Flash>,

    /// Data the template is rendered with.
    pub data: serde_json::Value,
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use crate::Flash;

    use super::View;

    #[test]
    fn serializes_template_flashes_and_data() {
        let view = View {
            template: "login.html",
            flashes: vec![Flash::info("You have been logged out.")],
            data: json!({ "email": "jane@example.com" }),
        };

        assert_eq!(
            serde_json::to_value(view).unwrap(),
            json!({
                "template": "login.html",
                "flashes": [{
                    "category": "info",
                    "message": "You have been logged out.",
                }],
                "data": { "email": "jane@example.com" },
            }),
        );
    }
}
