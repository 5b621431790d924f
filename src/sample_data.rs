//! Built-in sample categories and transactions from July 2023.
//!
//! Used by the demo pages and for seeding test databases.

use rusqlite::Connection;
use time::{Date, macros::date};

use crate::{
    Error,
    auth::UserID,
    category::{
        Category, CategoryColor, CategoryName, DEFAULT_CATEGORIES, create_default_categories,
        get_categories,
    },
    transaction::{NewTransaction, Transaction, TransactionType, create_transaction},
};

struct SampleTransaction {
    transaction_type: TransactionType,
    concept: &'static str,
    description: &'static str,
    amount: f64,
    date: Date,
    category_name: &'static str,
}

const SAMPLE_TRANSACTIONS: [SampleTransaction; 8] = [
    SampleTransaction {
        transaction_type: TransactionType::Income,
        concept: "Salario",
        description: "Salario mensual",
        amount: 3_500_000.0,
        date: date!(2023 - 07 - 05),
        category_name: "Salario",
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        concept: "Arriendo",
        description: "Arriendo mensual",
        amount: 1_200_000.0,
        date: date!(2023 - 07 - 02),
        category_name: "Hogar",
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        concept: "Mercado",
        description: "Compras del mes",
        amount: 450_000.0,
        date: date!(2023 - 07 - 10),
        category_name: "Alimentación",
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        concept: "Netflix",
        description: "Suscripción mensual",
        amount: 38_900.0,
        date: date!(2023 - 07 - 15),
        category_name: "Entretenimiento",
    },
    SampleTransaction {
        transaction_type: TransactionType::Income,
        concept: "Trabajo freelance",
        description: "Proyecto de diseño",
        amount: 850_000.0,
        date: date!(2023 - 07 - 18),
        category_name: "Otros ingresos",
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        concept: "Uber",
        description: "Viaje al aeropuerto",
        amount: 65_000.0,
        date: date!(2023 - 07 - 20),
        category_name: "Transporte",
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        concept: "Medicina",
        description: "Consulta médica",
        amount: 120_000.0,
        date: date!(2023 - 07 - 22),
        category_name: "Salud",
    },
    SampleTransaction {
        transaction_type: TransactionType::Expense,
        concept: "Curso online",
        description: "Curso de desarrollo web",
        amount: 250_000.0,
        date: date!(2023 - 07 - 25),
        category_name: "Educación",
    },
];

/// The default categories with IDs 1 to 8, in [DEFAULT_CATEGORIES] order.
pub fn sample_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .zip(1..)
        .map(|((name, color), id)| Category {
            id,
            name: CategoryName::new_unchecked(name),
            color: CategoryColor::new_unchecked(color),
            icon: None,
        })
        .collect()
}

/// The sample transactions with IDs 1 to 8 that refer to [sample_categories].
pub fn sample_transactions() -> Vec<Transaction> {
    let categories = sample_categories();

    SAMPLE_TRANSACTIONS
        .iter()
        .zip(1..)
        .map(|(sample, id)| new_sample_transaction(sample, &categories).with_id(id))
        .collect()
}

fn new_sample_transaction(sample: &SampleTransaction, categories: &[Category]) -> NewTransaction {
    let category_id = categories
        .iter()
        .find(|category| category.name.as_ref() == sample.category_name)
        .map(|category| category.id);

    NewTransaction::new(
        sample.transaction_type,
        sample.concept,
        sample.amount,
        sample.date,
    )
    .description(sample.description)
    .category_id(category_id)
}

/// Save the sample transactions for `user_id`.
///
/// The user's categories are matched by name. If the user has no categories,
/// the default categories are created first.
///
/// # Errors
/// Returns an error if any insert fails, in which case nothing is saved.
pub fn insert_sample_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let mut categories = get_categories(user_id, &sql_transaction)?;
    if categories.is_empty() {
        categories = create_default_categories(user_id, &sql_transaction)?;
    }

    let transactions = SAMPLE_TRANSACTIONS
        .iter()
        .map(|sample| {
            create_transaction(
                user_id,
                new_sample_transaction(sample, &categories),
                &sql_transaction,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    sql_transaction.commit()?;

    Ok(transactions)
}
