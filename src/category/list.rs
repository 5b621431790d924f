//! Categories listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, create::new_category_form_view, get_categories},
    database_id::CategoryId,
    endpoints,
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, delete_button,
    },
    navigation::NavBar,
    notification::{Notification, NotificationQueue, notifications_view},
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

struct CategoryRow {
    category: Category,
    transaction_count: u32,
}

/// Render the user's categories with how many transactions use each one.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transactions_per_category = count_transactions_per_category(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not count transactions per category: {error}")
        })?;

    let rows = categories
        .into_iter()
        .map(|category| CategoryRow {
            transaction_count: *transactions_per_category.get(&category.id).unwrap_or(&0),
            category,
        })
        .collect::<Vec<_>>();

    let notifications = state.notifications.drain(user_id);

    Ok(categories_view(&rows, notifications).into_response())
}

fn count_transactions_per_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM transactions
            WHERE user_id = ?1 AND category_id IS NOT NULL
            GROUP BY category_id",
        )?
        .query_map([user_id.as_i64()], |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

/// A coloured badge with the category's icon and name, or a grey
/// "Sin categoría" badge when the transaction has no (remaining) category.
pub fn category_badge(category: Option<&Category>) -> Markup {
    match category {
        Some(category) => html! {
            span
                class=(CATEGORY_BADGE_STYLE)
                style={ "background-color: " (category.color) "33; color: " (category.color) ";" }
            {
                @if let Some(icon) = &category.icon {
                    span class="me-1" { (icon) }
                }
                (category.name)
            }
        },
        None => html! {
            span class={ (CATEGORY_BADGE_STYLE) " bg-gray-100 text-gray-600 dark:bg-gray-700 dark:text-gray-300" }
            {
                "Sin categoría"
            }
        },
    }
}

fn categories_view(rows: &[CategoryRow], notifications: Vec<Notification>) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |row: &CategoryRow| {
        let delete_url = endpoints::format_endpoint(endpoints::CATEGORY, row.category.id);
        let confirm_message = format!(
            "¿Eliminar la categoría \"{}\"? Sus {} transacciones quedarán como \"Sin categoría\".",
            row.category.name, row.transaction_count
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (category_badge(Some(&row.category))) }
                td class=(TABLE_CELL_STYLE) { (row.transaction_count) }
                td class=(TABLE_CELL_STYLE)
                {
                    (delete_button(&delete_url, &confirm_message, "closest tr"))
                }
            }
        )
    };

    let content = html!(
        (nav_bar)
        (notifications_view(notifications))

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                h1 class="text-xl font-bold" { "Categorías" }

                div class=(CARD_STYLE) { (new_category_form_view()) }

                div class="overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Nombre" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Transacciones" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Acciones" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "Aún no tienes categorías."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Categorías", &[], &content)
}
