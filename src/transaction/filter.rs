//! Filtering and sorting for the transactions list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::transaction::core::{Transaction, TransactionType};

/// Which transaction types to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    All,
    Income,
    Expense,
}

impl FilterType {
    fn matches(&self, transaction_type: TransactionType) -> bool {
        match self {
            FilterType::All => true,
            FilterType::Income => transaction_type == TransactionType::Income,
            FilterType::Expense => transaction_type == TransactionType::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Amount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// The query parameters of the transactions page.
///
/// Missing parameters fall back to showing everything, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    pub filter: FilterType,
    pub search: String,
    pub sort_by: SortBy,
    pub direction: SortDirection,
}

impl ListOptions {
    /// The options after clicking the `sort_by` column header.
    ///
    /// Clicking the current sort column flips the direction, clicking another
    /// column sorts by it in descending order.
    pub fn toggle(&self, sort_by: SortBy) -> Self {
        let direction = if self.sort_by == sort_by {
            self.direction.flip()
        } else {
            SortDirection::Desc
        };

        Self {
            sort_by,
            direction,
            ..self.clone()
        }
    }

    /// Encode the options as a URL query string, e.g. `filter=all&search=&sort_by=date&direction=desc`.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_else(|error| {
            tracing::error!("could not encode list options {self:?}: {error}");
            String::new()
        })
    }
}

/// Select the transactions matching `options` and order them.
///
/// The search term is matched case-insensitively against the concept and the
/// description. The sort is stable, so transactions with equal keys keep their
/// order from `transactions`.
pub fn filter_and_sort(transactions: &[Transaction], options: &ListOptions) -> Vec<Transaction> {
    let search = options.search.to_lowercase();

    let mut matching: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| options.filter.matches(transaction.transaction_type))
        .filter(|transaction| search.is_empty() || contains_search_term(transaction, &search))
        .cloned()
        .collect();

    let compare_key = |a: &Transaction, b: &Transaction| -> Ordering {
        match options.sort_by {
            SortBy::Date => a.date.cmp(&b.date),
            SortBy::Amount => a.amount.total_cmp(&b.amount),
        }
    };

    match options.direction {
        SortDirection::Asc => matching.sort_by(compare_key),
        SortDirection::Desc => matching.sort_by(|a, b| compare_key(b, a)),
    }

    matching
}

fn contains_search_term(transaction: &Transaction, lowercase_search: &str) -> bool {
    transaction.concept.to_lowercase().contains(lowercase_search)
        || transaction
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(lowercase_search))
}

#[cfg(test)]
mod list_options_tests {
    use super::{FilterType, ListOptions, SortBy, SortDirection};

    #[test]
    fn missing_query_params_use_defaults() {
        let options: ListOptions = serde_urlencoded::from_str("").unwrap();

        assert_eq!(
            options,
            ListOptions {
                filter: FilterType::All,
                search: String::new(),
                sort_by: SortBy::Date,
                direction: SortDirection::Desc,
            }
        );
    }

    #[test]
    fn parses_query_params() {
        let options: ListOptions =
            serde_urlencoded::from_str("filter=expense&search=mercado&sort_by=amount&direction=asc")
                .unwrap();

        assert_eq!(
            options,
            ListOptions {
                filter: FilterType::Expense,
                search: "mercado".to_owned(),
                sort_by: SortBy::Amount,
                direction: SortDirection::Asc,
            }
        );
    }

    #[test]
    fn query_string_round_trips() {
        let options = ListOptions {
            filter: FilterType::Income,
            search: "café con leche".to_owned(),
            sort_by: SortBy::Amount,
            direction: SortDirection::Asc,
        };

        let parsed: ListOptions = serde_urlencoded::from_str(&options.to_query_string()).unwrap();

        assert_eq!(parsed, options);
    }

    #[test]
    fn toggle_same_column_flips_direction() {
        let options = ListOptions::default();

        let toggled = options.toggle(SortBy::Date);
        assert_eq!(toggled.sort_by, SortBy::Date);
        assert_eq!(toggled.direction, SortDirection::Asc);

        assert_eq!(toggled.toggle(SortBy::Date).direction, SortDirection::Desc);
    }

    #[test]
    fn toggle_new_column_sorts_descending() {
        let options = ListOptions {
            direction: SortDirection::Asc,
            ..Default::default()
        };

        let toggled = options.toggle(SortBy::Amount);

        assert_eq!(toggled.sort_by, SortBy::Amount);
        assert_eq!(toggled.direction, SortDirection::Desc);
    }

    #[test]
    fn toggle_keeps_filter_and_search() {
        let options = ListOptions {
            filter: FilterType::Expense,
            search: "arriendo".to_owned(),
            ..Default::default()
        };

        let toggled = options.toggle(SortBy::Amount);

        assert_eq!(toggled.filter, FilterType::Expense);
        assert_eq!(toggled.search, "arriendo");
    }
}
