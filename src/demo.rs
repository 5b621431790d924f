//! Read-only pages over the built-in sample data that anyone can view
//! without signing in.

use axum::{
    extract::Query,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    sample_data::{sample_categories, sample_transactions},
    summary::{dashboard_view, expenses_by_category, summarize},
    transaction::{ListOptions, TransactionsListConfig, filter_and_sort, transactions_list_view},
};

/// The dashboard computed in memory from the sample transactions.
pub async fn get_demo_page() -> Response {
    let transactions = sample_transactions();
    let categories = sample_categories();

    dashboard_view(
        NavBar::demo(endpoints::DEMO_VIEW),
        endpoints::DEMO_TRANSACTIONS_VIEW,
        Vec::new(),
        &summarize(&transactions),
        &expenses_by_category(&transactions, &categories),
        &categories,
    )
    .into_response()
}

/// The sample transactions, filtered and sorted by the query parameters.
pub async fn get_demo_transactions_page(Query(options): Query<ListOptions>) -> Response {
    let transactions = filter_and_sort(&sample_transactions(), &options);
    let categories = sample_categories();

    let content = html! {
        (NavBar::demo(endpoints::DEMO_TRANSACTIONS_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (transactions_list_view(
                &transactions,
                &categories,
                &options,
                &TransactionsListConfig {
                    page_url: endpoints::DEMO_TRANSACTIONS_VIEW,
                    editable: false,
                },
            ))
        }
    };

    base("Transacciones", &[], &content).into_response()
}
