//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction` used to create and update them
//! - Database functions for storing, querying, and managing a user's transactions
//! - Form validation, list filtering and sorting
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod filter;
mod form;
mod transactions_page;
mod view;

pub use core::{
    NewTransaction, Transaction, TransactionType, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, get_transactions, map_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_new_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use filter::{FilterType, ListOptions, filter_and_sort};
pub use transactions_page::get_transactions_page;
pub use view::{TransactionsListConfig, transactions_list_view};
