//! The dashboard page: totals, balance, recent transactions and the expense chart.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, category_badge, get_categories},
    database_id::CategoryId,
    endpoints,
    html::{
        CARD_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
        format_date,
    },
    navigation::NavBar,
    notification::{Notification, NotificationQueue, notifications_view},
    summary::{
        chart::{DashboardChart, chart_script, chart_view, expenses_chart},
        core::{
            CategoryExpense, DashboardSummary, get_dashboard_summary, get_expenses_by_category,
        },
    },
    transaction::{Transaction, TransactionType},
};

/// Message shown in place of the recent transactions when there are none.
pub const NO_RECENT_TRANSACTIONS_MSG: &str = "No hay transacciones recientes";
/// Message shown in place of the chart when there are no expenses.
pub const NO_EXPENSES_MSG: &str = "Aún no hay gastos registrados";

const EXPENSES_CHART_ID: &str = "expenses-chart";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub notifications: NotificationQueue,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifications: state.notifications.clone(),
        }
    }
}

/// Display a page with an overview of the user's finances.
///
/// The summary is recomputed from the database on every request.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (summary, expenses, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let summary = get_dashboard_summary(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get dashboard summary: {error}"))?;
        let expenses = get_expenses_by_category(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get expenses by category: {error}"))?;
        let categories = get_categories(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

        (summary, expenses, categories)
    };

    let notifications = state.notifications.drain(user_id);

    Ok(dashboard_view(
        NavBar::new(endpoints::DASHBOARD_VIEW),
        endpoints::TRANSACTIONS_VIEW,
        notifications,
        &summary,
        &expenses,
        &categories,
    )
    .into_response())
}

/// The full dashboard page, shared by signed in users and the demo.
///
/// `transactions_url` is the page linked to from the recent transactions.
pub fn dashboard_view(
    nav_bar: NavBar<'_>,
    transactions_url: &str,
    notifications: Vec<Notification>,
    summary: &DashboardSummary,
    expenses: &[CategoryExpense],
    categories: &[Category],
) -> Markup {
    let chart = (!expenses.is_empty()).then(|| DashboardChart {
        id: EXPENSES_CHART_ID,
        options: expenses_chart(expenses).to_string(),
    });

    let content = html!(
        (nav_bar.into_html())
        (notifications_view(notifications))

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Resumen" }

                (totals_view(summary))

                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (recent_transactions_view(
                        &summary.recent_transactions,
                        categories,
                        transactions_url,
                    ))

                    div id="expenses" class=(CARD_STYLE)
                    {
                        @match &chart {
                            Some(chart) => {
                                (chart_view(chart))
                            }
                            None => {
                                h2 class="text-lg font-semibold mb-2" { "Distribución de gastos" }
                                p class="text-gray-500 dark:text-gray-400" { (NO_EXPENSES_MSG) }
                            }
                        }
                    }
                }
            }
        }
    );

    let head_elements = match &chart {
        Some(chart) => vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            chart_script(chart),
        ],
        None => Vec::new(),
    };

    base("Inicio", &head_elements, &content)
}

fn totals_view(summary: &DashboardSummary) -> Markup {
    let balance = summary.balance();
    let balance_style = if balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-gray-900 dark:text-white"
    };

    let card = |id: &str, title: &str, amount: f64, amount_style: &str| {
        html!(
            div id=(id) class=(CARD_STYLE)
            {
                h2 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
                p class={ "mt-2 text-2xl font-bold " (amount_style) } { (format_currency(amount)) }
            }
        )
    };

    html!(
        div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            (card(
                "total-income",
                "Ingresos totales",
                summary.total_income,
                "text-green-600 dark:text-green-400",
            ))
            (card(
                "total-expense",
                "Gastos totales",
                summary.total_expense,
                "text-red-600 dark:text-red-400",
            ))
            (card("balance", "Saldo", balance, balance_style))
        }
    )
}

fn recent_transactions_view(
    transactions: &[Transaction],
    categories: &[Category],
    transactions_url: &str,
) -> Markup {
    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    html!(
        div id="recent-transactions" class=(CARD_STYLE)
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h2 class="text-lg font-semibold" { "Transacciones recientes" }
                a href=(transactions_url) class=(LINK_STYLE) { "Ver todas" }
            }

            @if transactions.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { (NO_RECENT_TRANSACTIONS_MSG) }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in transactions {
                        @let category = transaction
                            .category_id
                            .and_then(|id| categories_by_id.get(&id).copied());
                        @let amount_style = match transaction.transaction_type {
                            TransactionType::Income => "text-green-600 dark:text-green-400",
                            TransactionType::Expense => "text-red-600 dark:text-red-400",
                        };

                        li class="flex justify-between items-center gap-4 py-3"
                        {
                            div
                            {
                                p class="concept font-medium text-gray-900 dark:text-white"
                                {
                                    (transaction.concept)
                                }
                                p class="text-sm text-gray-500 dark:text-gray-400"
                                {
                                    (format_date(transaction.date)) " "
                                    (category_badge(category))
                                }
                            }

                            p class={ "amount whitespace-nowrap font-semibold " (amount_style) }
                            {
                                (format_currency(transaction.signed_amount()))
                            }
                        }
                    }
                }
            }
        }
    )
}
