//! Defines the route handler for the page for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::get_categories,
    database_id::TransactionId,
    transaction::{
        core::get_transaction,
        form::{
            FormAction, FormErrors, RawTransactionForm, transaction_form_page,
            transaction_form_view,
        },
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction, pre-filled with its current values.
///
/// Responds with the 404 page if the transaction does not exist or belongs to
/// another user.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
        }
    })?;

    let categories = get_categories(user_id, &connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve categories for edit transaction page: {error}")
    })?;

    let form = transaction_form_view(
        &RawTransactionForm::from(&transaction),
        &FormErrors::default(),
        &categories,
        FormAction::Update(transaction_id),
    );

    Ok(transaction_form_page("Editar transacción", form).into_response())
}
