//! Defines the endpoint for updating an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
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
    database_id::TransactionId,
    endpoints,
    notification::{Notification, NotificationQueue},
    transaction::{
        core::update_transaction,
        form::{FormAction, RawTransactionForm, invalid_form_response, save_failed_response},
    },
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

/// Replace the fields of a transaction with the submitted form.
///
/// Concurrent edits are not detected, the last update wins.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Path(transaction_id): Path<TransactionId>,
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

            return invalid_form_response(
                &form,
                &errors,
                &categories,
                FormAction::Update(transaction_id),
            );
        }
    };

    match update_transaction(transaction_id, user_id, new_transaction, &connection) {
        Ok(_) => {}
        Err(Error::UpdateMissingTransaction) => {
            tracing::warn!("user {user_id} tried to update missing transaction {transaction_id}");
            return Error::UpdateMissingTransaction.into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            return save_failed_response();
        }
    }

    state
        .notifications
        .publish(user_id, Notification::new("Transacción actualizada"));

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod update_transaction_endpoint_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
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
        test_utils::{assert_form_error_message, assert_hx_redirect, parse_html_fragment},
        transaction::{
            NewTransaction, Transaction, TransactionType, create_transaction,
            form::{NEGATIVE_AMOUNT_MSG, RawTransactionForm},
            get_transaction,
        },
    };

    use super::{UpdateTransactionState, update_transaction_endpoint};

    fn get_state() -> (UpdateTransactionState, UserID, UserID, Transaction) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let [owner, other] = ["ana@example.com", "luis@example.com"].map(|email| {
            create_user(
                EmailAddress::from_str(email).unwrap(),
                PasswordHash::new_unchecked("hunter2"),
                &conn,
            )
            .unwrap()
            .id
        });
        let transaction = create_transaction(
            owner,
            NewTransaction::new(
                TransactionType::Expense,
                "Arriendo",
                1_200_000.0,
                date!(2023 - 07 - 02),
            ),
            &conn,
        )
        .unwrap();

        let state = UpdateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
            notifications: NotificationQueue::default(),
        };

        (state, owner, other, transaction)
    }

    fn form(amount: &str) -> RawTransactionForm {
        RawTransactionForm {
            transaction_type: "expense".to_owned(),
            concept: "Arriendo agosto".to_owned(),
            description: String::new(),
            amount: amount.to_owned(),
            date: "2023-08-02".to_owned(),
            category_id: "3".to_owned(),
        }
    }

    #[tokio::test]
    async fn updates_transaction_and_keeps_id() {
        let (state, owner, _, transaction) = get_state();

        let response = update_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id),
            Extension(owner),
            Form(form("1300000")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let updated =
            get_transaction(transaction.id, owner, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.id, transaction.id);
        assert_eq!(updated.concept, "Arriendo agosto");
        assert_eq!(updated.amount, 1_300_000.0);
        assert_eq!(updated.date, date!(2023 - 08 - 02));
        assert_eq!(updated.category_id, Some(3));

        assert_eq!(
            state.notifications.drain(owner),
            [Notification::new("Transacción actualizada")]
        );
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_and_nothing_changes() {
        let (state, owner, _, transaction) = get_state();

        let response = update_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id),
            Extension(owner),
            Form(form("-5")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(&html, NEGATIVE_AMOUNT_MSG);
        assert_eq!(
            get_transaction(transaction.id, owner, &state.db_connection.lock().unwrap()).unwrap(),
            transaction
        );
    }

    #[tokio::test]
    async fn cannot_update_other_users_transaction() {
        let (state, owner, other, transaction) = get_state();

        let response = update_transaction_endpoint(
            State(state.clone()),
            Path(transaction.id),
            Extension(other),
            Form(form("1")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_transaction(transaction.id, owner, &state.db_connection.lock().unwrap()).unwrap(),
            transaction
        );
        assert!(state.notifications.drain(other).is_empty());
    }
}
