//! Alert fragments for displaying success and error messages to users.
//!
//! HTMX forms target `#alert-container` for error responses, so an alert
//! rendered here replaces the contents of that container.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable message shown in the alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with extra details.
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as a HTML fragment.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, Some(details)),
            Alert::SuccessSimple { message } => (false, message, None),
            Alert::Error { message, details } => (true, message, Some(details)),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 text-red-800 border border-red-300 rounded-lg \
            bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800 shadow-lg"
        } else {
            "flex items-start p-4 mb-4 text-green-800 border border-green-300 rounded-lg \
            bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800 shadow-lg"
        };

        html! {
            div class=(container_style) role="alert"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty())
                    {
                        p class="text-sm mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Cerrar"
                    class="ms-3 -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex h-8 w-8
                        items-center justify-center hover:bg-gray-200 dark:hover:bg-gray-700"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert wrapped in an out-of-band swap for the alert container.
    ///
    /// Used when the main response body targets another element, e.g. when a
    /// deleted table row is replaced and a confirmation should still be shown.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                (self.into_html())
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
