//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::{CategoryId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// The value stored in the database and submitted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Ingreso",
            TransactionType::Expense => "Gasto",
        }
    }

    /// Parse the form/database representation, returning `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        TransactionType::parse(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    pub transaction_type: TransactionType,
    /// A short label, e.g. "Salario julio".
    pub concept: String,
    pub description: Option<String>,
    /// The amount of money earned or spent. Never negative, the sign comes
    /// from [Transaction::transaction_type].
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// The category the transaction belongs to.
    ///
    /// The category may have since been deleted.
    pub category_id: Option<CategoryId>,
}

impl Transaction {
    /// The amount with expenses as negative values.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// A validated transaction that has not been saved yet.
///
/// Also used to replace the fields of an existing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub concept: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: Date,
    pub category_id: Option<CategoryId>,
}

impl NewTransaction {
    /// Start a transaction without a description or category.
    pub fn new(transaction_type: TransactionType, concept: &str, amount: f64, date: Date) -> Self {
        Self {
            transaction_type,
            concept: concept.to_owned(),
            description: None,
            amount,
            date,
            category_id: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Attach an ID, e.g. for in-memory data that never touches the database.
    pub fn with_id(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            transaction_type: self.transaction_type,
            concept: self.concept,
            description: self.description,
            amount: self.amount,
            date: self.date,
            category_id: self.category_id,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "id, transaction_type, concept, description, amount, date, category_id";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                concept TEXT NOT NULL,
                description TEXT,
                amount REAL NOT NULL CHECK (amount >= 0),
                date TEXT NOT NULL,
                category_id INTEGER
                )",
        (),
    )?;

    // Used by the dashboard and transactions pages.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Save a new transaction owned by `user_id`.
///
/// # Errors
/// Returns a [Error::SqlError] if the insert fails.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO transactions
                (user_id, transaction_type, concept, description, amount, date, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.transaction_type,
                new_transaction.concept,
                new_transaction.description,
                new_transaction.amount,
                new_transaction.date,
                new_transaction.category_id,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all of `user_id`'s transactions, newest first.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions
            WHERE user_id = ?1
            ORDER BY date DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace every field of one of `user_id`'s transactions except its ID.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let rows_affected = connection.execute(
        "UPDATE transactions
        SET transaction_type = ?1, concept = ?2, description = ?3, amount = ?4, date = ?5,
            category_id = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            new_transaction.transaction_type,
            &new_transaction.concept,
            &new_transaction.description,
            new_transaction.amount,
            new_transaction.date,
            new_transaction.category_id,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(new_transaction.with_id(id))
}

/// Delete one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order `id, transaction_type, concept,
/// description, amount, date, category_id`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let transaction_type = row.get(1)?;
    let concept = row.get(2)?;
    let description = row.get(3)?;
    let amount = row.get(4)?;
    let date = row.get(5)?;
    let category_id = row.get(6)?;

    Ok(Transaction {
        id,
        transaction_type,
        concept,
        description,
        amount,
        date,
        category_id,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        auth::{UserID, create_user},
        db::initialize,
    };

    use super::{
        NewTransaction, TransactionType, create_transaction, delete_transaction, get_transaction,
        get_transactions, update_transaction,
    };

    fn get_test_connection() -> (Connection, UserID, UserID) {
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

        (conn, owner, other)
    }

    fn salary() -> NewTransaction {
        NewTransaction::new(
            TransactionType::Income,
            "Salario julio",
            3_500_000.0,
            date!(2023 - 07 - 05),
        )
    }

    #[test]
    fn create_succeeds() {
        let (conn, owner, _) = get_test_connection();

        let transaction =
            create_transaction(owner, salary().description("Pago mensual"), &conn).unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.transaction_type, TransactionType::Income);
        assert_eq!(transaction.concept, "Salario julio");
        assert_eq!(transaction.description.as_deref(), Some("Pago mensual"));
        assert_eq!(transaction.amount, 3_500_000.0);
        assert_eq!(transaction.date, date!(2023 - 07 - 05));
        assert_eq!(
            get_transaction(transaction.id, owner, &conn).unwrap(),
            transaction
        );
    }

    #[test]
    fn negative_amount_violates_constraint() {
        let (conn, owner, _) = get_test_connection();
        let mut transaction = salary();
        transaction.amount = -1.0;

        let result = create_transaction(owner, transaction, &conn);

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn category_id_is_a_weak_reference() {
        let (conn, owner, _) = get_test_connection();

        let transaction =
            create_transaction(owner, salary().category_id(Some(999)), &conn).unwrap();

        assert_eq!(transaction.category_id, Some(999));
    }

    #[test]
    fn get_transactions_is_newest_first_and_scoped_to_user() {
        let (conn, owner, other) = get_test_connection();
        let older = create_transaction(
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
        let newer = create_transaction(owner, salary(), &conn).unwrap();
        create_transaction(other, salary(), &conn).unwrap();

        let transactions = get_transactions(owner, &conn).unwrap();

        assert_eq!(transactions, [newer, older]);
    }

    #[test]
    fn get_other_users_transaction_is_not_found() {
        let (conn, owner, other) = get_test_connection();
        let transaction = create_transaction(owner, salary(), &conn).unwrap();

        assert_eq!(
            get_transaction(transaction.id, other, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let (conn, owner, _) = get_test_connection();
        let transaction = create_transaction(owner, salary(), &conn).unwrap();
        let replacement = NewTransaction::new(
            TransactionType::Expense,
            "Mercado semanal",
            250_000.0,
            date!(2023 - 07 - 08),
        )
        .category_id(Some(1));

        let updated =
            update_transaction(transaction.id, owner, replacement.clone(), &conn).unwrap();

        assert_eq!(updated, replacement.with_id(transaction.id));
        assert_eq!(get_transaction(transaction.id, owner, &conn).unwrap(), updated);
    }

    #[test]
    fn update_other_users_transaction_fails() {
        let (conn, owner, other) = get_test_connection();
        let transaction = create_transaction(owner, salary(), &conn).unwrap();

        let result = update_transaction(
            transaction.id,
            other,
            salary().description("cambiado"),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
        assert_eq!(
            get_transaction(transaction.id, owner, &conn).unwrap(),
            transaction
        );
    }

    #[test]
    fn delete_succeeds() {
        let (conn, owner, _) = get_test_connection();
        let transaction = create_transaction(owner, salary(), &conn).unwrap();

        delete_transaction(transaction.id, owner, &conn).unwrap();

        assert_eq!(
            get_transaction(transaction.id, owner, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_missing_or_foreign_transaction_fails() {
        let (conn, owner, other) = get_test_connection();
        let transaction = create_transaction(owner, salary(), &conn).unwrap();

        assert_eq!(
            delete_transaction(transaction.id, other, &conn),
            Err(Error::DeleteMissingTransaction)
        );
        assert_eq!(
            delete_transaction(999, owner, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }
}
