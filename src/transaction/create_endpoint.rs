//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::get_categories,
    endpoints,
    notification::{Notification, NotificationQueue},
    transaction::{
        core::create_transaction,
        form::{FormAction, RawTransactionForm, invalid_form_response, save_failed_response},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// Invalid forms are sent back with status 422 and nothing is saved.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<RawTransactionForm>,
) -> Response {
    let validated = form.validate();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_transaction = match validated {
        Ok(new_transaction) => new_transaction,
        Err(errors) => {
            let categories = match get_categories(user_id, &connection) {
                Ok(categories) => categories,
                Err(error) => {
                    tracing::error!("could not get categories for transaction form: {error}");
                    return error.into_alert_response();
                }
            };

            return invalid_form_response(&form, &errors, &categories, FormAction::Create);
        }
    };

    if let Err(error) = create_transaction(user_id, new_transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return save_failed_response();
    }

    state
        .notifications
        .publish(user_id, Notification::new("Transacción agregada"));

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        auth::{UserID, create_user},
        db::initialize,
        endpoints,
        notification::{Notification, NotificationQueue},
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, parse_html_fragment,
        },
        transaction::{
            TransactionType,
            form::{CONCEPT_TOO_SHORT_MSG, RawTransactionForm},
            get_transactions,
        },
    };

    use super::{CreateTransactionState, create_transaction_endpoint};

    fn get_state() -> (CreateTransactionState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            EmailAddress::from_str("ana@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
            notifications: NotificationQueue::default(),
        };

        (state, user.id)
    }

    fn form(concept: &str) -> RawTransactionForm {
        RawTransactionForm {
            transaction_type: "expense".to_owned(),
            concept: concept.to_owned(),
            description: " Compras del mes ".to_owned(),
            amount: "450000".to_owned(),
            date: "2023-07-10".to_owned(),
            category_id: String::new(),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, user_id) = get_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("Mercado del mes")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let transactions = get_transactions(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(transactions.len(), 1);
        let transaction = &transactions[0];
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.concept, "Mercado del mes");
        assert_eq!(transaction.description.as_deref(), Some("Compras del mes"));
        assert_eq!(transaction.amount, 450_000.0);
        assert_eq!(transaction.date, date!(2023 - 07 - 10));
    }

    #[tokio::test]
    async fn success_publishes_notification() {
        let (state, user_id) = get_state();

        create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("Mercado del mes")),
        )
        .await;

        assert_eq!(
            state.notifications.drain(user_id),
            [Notification::new("Transacción agregada")]
        );
    }

    #[tokio::test]
    async fn short_concept_is_rejected_before_saving() {
        let (state, user_id) = get_state();

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form("ab")))
                .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_form_error_message(&html, CONCEPT_TOO_SHORT_MSG);

        assert!(
            get_transactions(user_id, &state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
        assert!(state.notifications.drain(user_id).is_empty());
    }

    #[tokio::test]
    async fn database_failure_shows_save_failed_alert() {
        let (state, user_id) = get_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("DROP TABLE transactions", ())
            .unwrap();

        let response = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Form(form("Mercado del mes")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("No se pudo guardar la transacción"));
    }
}
