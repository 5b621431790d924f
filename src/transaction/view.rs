//! The transactions table, shared by the user's transactions page and the demo.

use std::collections::HashMap;

use maud::{Markup, html};

use crate::{
    category::{Category, category_badge},
    database_id::CategoryId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, edit_delete_action_links,
        format_currency, format_date,
    },
    transaction::{
        core::{Transaction, TransactionType},
        filter::{FilterType, ListOptions, SortBy, SortDirection},
    },
};

/// Message shown when no transaction matches the filters.
pub const NO_TRANSACTIONS_MSG: &str = "No se encontraron transacciones";

/// Options for rendering [transactions_list_view].
pub struct TransactionsListConfig<'a> {
    /// The page the filter form and sort links point to.
    pub page_url: &'a str,
    /// Whether to show the "Nueva transacción" link and the edit/delete actions.
    pub editable: bool,
}

/// The filter form and the table of `transactions`.
///
/// `transactions` should already be filtered and sorted with `options`.
pub fn transactions_list_view(
    transactions: &[Transaction],
    categories: &[Category],
    options: &ListOptions,
    config: &TransactionsListConfig<'_>,
) -> Markup {
    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();
    let column_count = if config.editable { 6 } else { 5 };

    html! {
        section class="w-full max-w-5xl space-y-4"
        {
            header class="flex justify-between flex-wrap items-end gap-2"
            {
                h1 class="text-xl font-bold" { "Transacciones" }

                @if config.editable {
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Nueva transacción"
                    }
                }
            }

            (filter_form_view(options, config.page_url))

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Concepto" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Descripción" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Categoría" }
                            th scope="col" class=(TABLE_CELL_STYLE)
                            {
                                (sort_link("Fecha", SortBy::Date, options, config.page_url))
                            }
                            th scope="col" class={ (TABLE_CELL_STYLE) " text-right" }
                            {
                                (sort_link("Monto", SortBy::Amount, options, config.page_url))
                            }
                            @if config.editable {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Acciones" }
                            }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            @let category = transaction
                                .category_id
                                .and_then(|id| categories_by_id.get(&id).copied());
                            (transaction_row(transaction, category, config.editable))
                        }

                        @if transactions.is_empty() {
                            tr
                            {
                                td
                                    colspan=(column_count)
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    (NO_TRANSACTIONS_MSG)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn filter_form_view(options: &ListOptions, page_url: &str) -> Markup {
    let filters = [
        (FilterType::All, "all", "Todas"),
        (FilterType::Income, "income", "Ingresos"),
        (FilterType::Expense, "expense", "Gastos"),
    ];
    let sort_by = match options.sort_by {
        SortBy::Date => "date",
        SortBy::Amount => "amount",
    };
    let direction = match options.direction {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    };

    html! {
        form
            method="get"
            action=(page_url)
            class="grid grid-cols-1 sm:grid-cols-[10rem_1fr_auto] gap-4 items-end"
        {
            div
            {
                label for="filter" class=(FORM_LABEL_STYLE) { "Tipo" }

                select id="filter" name="filter" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for (filter, value, label) in filters {
                        option value=(value) selected[filter == options.filter] { (label) }
                    }
                }
            }

            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Buscar" }

                input
                    id="search"
                    type="search"
                    name="search"
                    placeholder="Concepto o descripción"
                    value=(options.search)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            input type="hidden" name="sort_by" value=(sort_by);
            input type="hidden" name="direction" value=(direction);

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filtrar" }
        }
    }
}

fn sort_link(label: &str, sort_by: SortBy, options: &ListOptions, page_url: &str) -> Markup {
    let url = format!("{page_url}?{}", options.toggle(sort_by).to_query_string());
    let arrow = match (options.sort_by == sort_by, options.direction) {
        (false, _) => "",
        (true, SortDirection::Asc) => " ↑",
        (true, SortDirection::Desc) => " ↓",
    };

    html! {
        a href=(url) class="hover:underline" { (label) (arrow) }
    }
}

fn transaction_row(
    transaction: &Transaction,
    category: Option<&Category>,
    editable: bool,
) -> Markup {
    let amount_style = match transaction.transaction_type {
        TransactionType::Income => "text-green-600 dark:text-green-400",
        TransactionType::Expense => "text-red-600 dark:text-red-400",
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class={ (TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white" }
            {
                (transaction.concept)
            }
            td class=(TABLE_CELL_STYLE)
            {
                (transaction.description.as_deref().unwrap_or(""))
            }
            td class=(TABLE_CELL_STYLE) { (category_badge(category)) }
            td class=(TABLE_CELL_STYLE) { (format_date(transaction.date)) }
            td class={ (TABLE_CELL_STYLE) " text-right whitespace-nowrap " (amount_style) }
            {
                (format_currency(transaction.signed_amount()))
            }
            @if editable {
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &endpoints::format_endpoint(
                                endpoints::EDIT_TRANSACTION_VIEW,
                                transaction.id,
                            ),
                            &endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id),
                            &format!("¿Eliminar la transacción \"{}\"?", transaction.concept),
                            "closest tr",
                        ))
                    }
                }
            }
        }
    }
}
