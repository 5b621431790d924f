//! Category creation form and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryColor, CategoryName, create_category},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    notification::{Notification, NotificationQueue},
};

/// The colour pre-selected in the creation form.
const DEFAULT_NEW_CATEGORY_COLOR: &str = "#64748b";

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

/// The raw data entered into the category form.
#[derive(Debug, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

/// Handle category form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let color = match CategoryColor::new(&form.color) {
        Ok(color) => color,
        Err(error) => return error.into_alert_response(),
    };

    let icon = Some(form.icon.trim())
        .filter(|icon| !icon.is_empty())
        .map(str::to_owned);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(user_id, name, color, icon, &connection) {
        Ok(category) => {
            state.notifications.publish(
                user_id,
                Notification::new(&format!("Categoría \"{}\" creada", category.name)),
            );

            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

/// The form for adding a category, shown at the top of the categories page.
pub(super) fn new_category_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            class="w-full grid grid-cols-1 sm:grid-cols-[1fr_auto_6rem_auto] gap-4 items-end"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Nombre" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Mascotas"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="color" class=(FORM_LABEL_STYLE) { "Color" }

                input
                    id="color"
                    type="color"
                    name="color"
                    value=(DEFAULT_NEW_CATEGORY_COLOR)
                    required
                    class="h-10 w-16 rounded cursor-pointer";
            }

            div
            {
                label for="icon" class=(FORM_LABEL_STYLE) { "Ícono" }

                input
                    id="icon"
                    type="text"
                    name="icon"
                    placeholder="🐶"
                    maxlength="8"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Agregar" }
        }
    }
}
