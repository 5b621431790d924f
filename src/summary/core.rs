//! Aggregation of a user's transactions into the dashboard summary.
//!
//! There are two variants of each aggregation:
//! - an in-memory version over a slice of transactions, used by the demo pages,
//! - a SQL version that runs fresh queries against the database on every call.
//!
//! Both produce the same result for the same set of transactions.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    category::Category,
    database_id::CategoryId,
    transaction::{Transaction, TransactionType, map_transaction_row},
};

/// The maximum number of transactions shown under "Transacciones recientes".
pub const RECENT_TRANSACTIONS_LIMIT: usize = 5;

/// The label used for expenses without a (remaining) category.
pub const UNCATEGORIZED_LABEL: &str = "Sin categoría";
/// The colour used for expenses without a (remaining) category.
pub const UNCATEGORIZED_COLOR: &str = "#9ca3af";

/// Totals and the most recent transactions for the dashboard.
///
/// The balance is not stored, see [DashboardSummary::balance].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSummary {
    /// The sum of the amounts of all income transactions.
    pub total_income: f64,
    /// The sum of the amounts of all expense transactions.
    pub total_expense: f64,
    /// Up to [RECENT_TRANSACTIONS_LIMIT] transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
}

impl DashboardSummary {
    /// Total income minus total expenses.
    pub fn balance(&self) -> f64 {
        self.total_income - self.total_expense
    }
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryExpense {
    pub name: String,
    pub color: String,
    pub total: f64,
}

/// Summarize `transactions` in memory.
///
/// Recent transactions are ordered by date, newest first. Transactions on the
/// same date keep the order they have in `transactions`.
pub fn summarize(transactions: &[Transaction]) -> DashboardSummary {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => total_income += transaction.amount,
            TransactionType::Expense => total_expense += transaction.amount,
        }
    }

    let mut recent_transactions = transactions.to_vec();
    recent_transactions.sort_by(|a, b| b.date.cmp(&a.date));
    recent_transactions.truncate(RECENT_TRANSACTIONS_LIMIT);

    DashboardSummary {
        total_income,
        total_expense,
        recent_transactions,
    }
}

/// Summarize the transactions of `user_id` with fresh queries.
///
/// Recent transactions on the same date are ordered by ID, lowest first.
///
/// # Errors
/// Returns an [Error::SqlError] if either query fails.
pub fn get_dashboard_summary(
    user_id: UserID,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let mut summary = DashboardSummary::default();

    let mut totals_statement = connection.prepare(
        "SELECT transaction_type, SUM(amount)
        FROM transactions
        WHERE user_id = ?1
        GROUP BY transaction_type",
    )?;
    let totals = totals_statement.query_map([user_id.as_i64()], |row| {
        Ok((row.get::<_, TransactionType>(0)?, row.get::<_, f64>(1)?))
    })?;

    for total in totals {
        match total? {
            (TransactionType::Income, amount) => summary.total_income = amount,
            (TransactionType::Expense, amount) => summary.total_expense = amount,
        }
    }

    summary.recent_transactions = connection
        .prepare(
            "SELECT id, transaction_type, concept, description, amount, date, category_id
            FROM transactions
            WHERE user_id = ?1
            ORDER BY date DESC, id ASC
            LIMIT ?2",
        )?
        .query_map(
            (user_id.as_i64(), RECENT_TRANSACTIONS_LIMIT as i64),
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summary)
}

/// Total the expenses in `transactions` per category, largest first.
///
/// Expenses whose category is missing from `categories` are grouped under
/// [UNCATEGORIZED_LABEL].
pub fn expenses_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategoryExpense> {
    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let mut totals: HashMap<Option<CategoryId>, f64> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
    {
        let category_id = transaction
            .category_id
            .filter(|id| categories_by_id.contains_key(id));
        *totals.entry(category_id).or_default() += transaction.amount;
    }

    let mut expenses: Vec<CategoryExpense> = totals
        .into_iter()
        .map(|(category_id, total)| {
            match category_id.and_then(|id| categories_by_id.get(&id)) {
                Some(category) => CategoryExpense {
                    name: category.name.to_string(),
                    color: category.color.to_string(),
                    total,
                },
                None => CategoryExpense {
                    name: UNCATEGORIZED_LABEL.to_owned(),
                    color: UNCATEGORIZED_COLOR.to_owned(),
                    total,
                },
            }
        })
        .collect();

    sort_expenses(&mut expenses);

    expenses
}

/// Total the expenses of `user_id` per category, largest first.
///
/// Expenses whose category has been deleted are grouped under
/// [UNCATEGORIZED_LABEL].
pub fn get_expenses_by_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryExpense>, Error> {
    let mut expenses = connection
        .prepare(
            "SELECT c.id, c.name, c.color, SUM(t.amount)
            FROM transactions t
            LEFT JOIN category c ON c.id = t.category_id AND c.user_id = t.user_id
            WHERE t.user_id = ?1 AND t.transaction_type = 'expense'
            GROUP BY c.id",
        )?
        .query_map([user_id.as_i64()], |row| {
            let name: Option<String> = row.get(1)?;
            let color: Option<String> = row.get(2)?;

            Ok(CategoryExpense {
                name: name.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned()),
                color: color.unwrap_or_else(|| UNCATEGORIZED_COLOR.to_owned()),
                total: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    sort_expenses(&mut expenses);

    Ok(expenses)
}

fn sort_expenses(expenses: &mut [CategoryExpense]) {
    expenses.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
}
