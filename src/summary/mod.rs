//! The dashboard summary of a user's finances.
//!
//! This module contains:
//! - `DashboardSummary` and the functions that compute it, both in memory and with SQL
//! - Totals of expenses per category and the chart that displays them
//! - The dashboard page handler and the view shared with the demo pages

mod chart;
mod core;
mod page;

pub use core::{expenses_by_category, summarize};
pub use page::{dashboard_view, get_dashboard_page};
