//! Categories group transactions for display, e.g. "Alimentación" or "Salario".
//!
//! Transactions only hold a weak reference to their category: deleting a
//! category leaves the transactions untouched, and they are shown as
//! "Sin categoría" from then on.

mod core;
mod create;
mod delete;
mod list;

pub use core::{
    Category, CategoryColor, CategoryName, DEFAULT_CATEGORIES, create_category,
    create_category_table, create_default_categories, delete_category, get_categories,
};
pub use create::create_category_endpoint;
pub use delete::delete_category_endpoint;
pub use list::{category_badge, get_categories_page};
