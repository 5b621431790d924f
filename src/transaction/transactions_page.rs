//! Defines the route handler for the page that displays transactions as a table.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::get_categories,
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    notification::{NotificationQueue, notifications_view},
    transaction::{
        core::get_transactions,
        filter::{ListOptions, filter_and_sort},
        view::{TransactionsListConfig, transactions_list_view},
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

/// Render the user's transactions filtered and sorted by the query parameters.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(options): Query<ListOptions>,
) -> Result<Response, Error> {
    let (transactions, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transactions = get_transactions(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
        let categories = get_categories(user_id, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

        (transactions, categories)
    };

    let visible = filter_and_sort(&transactions, &options);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let notifications = state.notifications.drain(user_id);

    let content = html! {
        (nav_bar)
        (notifications_view(notifications))

        main class=(PAGE_CONTAINER_STYLE)
        {
            (transactions_list_view(
                &visible,
                &categories,
                &options,
                &TransactionsListConfig {
                    page_url: endpoints::TRANSACTIONS_VIEW,
                    editable: true,
                },
            ))
        }
    };

    Ok(base("Transacciones", &[], &content).into_response())
}
