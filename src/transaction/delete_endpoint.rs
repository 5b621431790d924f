//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, auth::UserID, database_id::TransactionId,
    transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Deletes a transaction and returns a success alert for the alert container.
///
/// A transaction that does not exist, or belongs to another user, is reported
/// as not found rather than treated as already deleted.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Transacción eliminada".to_owned(),
        }
        .into_oob_html()
        .into_response(),
        Err(Error::DeleteMissingTransaction) => {
            tracing::warn!("user {user_id} tried to delete missing transaction {transaction_id}");
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!("could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        auth::{UserID, create_user},
        db::initialize,
        test_utils::{assert_valid_html, parse_html_fragment},
        transaction::{NewTransaction, TransactionType, create_transaction, get_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_state() -> (DeleteTransactionState, UserID, UserID, i64) {
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
                "Netflix julio",
                38_900.0,
                date!(2023 - 07 - 15),
            ),
            &conn,
        )
        .unwrap();

        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, owner, other, transaction.id)
    }

    #[tokio::test]
    async fn deletes_transaction() {
        let (state, owner, _, transaction_id) = get_state();

        let response =
            delete_transaction_endpoint(State(state.clone()), Path(transaction_id), Extension(owner))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Transacción eliminada"));
        assert_eq!(
            get_transaction(transaction_id, owner, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let (state, owner, _, transaction_id) = get_state();
        delete_transaction_endpoint(State(state.clone()), Path(transaction_id), Extension(owner))
            .await;

        let response =
            delete_transaction_endpoint(State(state), Path(transaction_id), Extension(owner)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("No se encontró la transacción"));
    }

    #[tokio::test]
    async fn cannot_delete_other_users_transaction() {
        let (state, owner, other, transaction_id) = get_state();

        let response =
            delete_transaction_endpoint(State(state.clone()), Path(transaction_id), Extension(other))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(
            get_transaction(transaction_id, owner, &state.db_connection.lock().unwrap()).is_ok()
        );
    }
}
