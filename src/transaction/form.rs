//! The transaction form shared by the create and edit pages, and its validation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    alert::Alert,
    category::Category,
    database_id::TransactionId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base, dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    transaction::core::{NewTransaction, Transaction, TransactionType},
};

/// The minimum number of characters in a transaction's concept.
pub const CONCEPT_MIN_LENGTH: usize = 5;

pub const INVALID_TYPE_MSG: &str = "Selecciona un tipo de transacción";
pub const CONCEPT_TOO_SHORT_MSG: &str = "El concepto debe tener al menos 5 caracteres";
pub const INVALID_AMOUNT_MSG: &str = "Ingresa un monto válido";
pub const NEGATIVE_AMOUNT_MSG: &str = "El monto debe ser mayor o igual a 0";
pub const INVALID_DATE_MSG: &str = "Ingresa una fecha válida";
pub const INVALID_CATEGORY_MSG: &str = "Categoría inválida";

/// The transaction form exactly as submitted.
///
/// Every field is kept as text so that invalid input can be shown back to the
/// user alongside the error messages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawTransactionForm {
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub concept: String,
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category_id: String,
}

/// Field-level validation messages. A `None` field is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    pub transaction_type: Option<&'static str>,
    pub concept: Option<&'static str>,
    pub amount: Option<&'static str>,
    pub date: Option<&'static str>,
    pub category_id: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl RawTransactionForm {
    /// An empty expense form dated `today`.
    pub fn empty(today: Date) -> Self {
        Self {
            transaction_type: TransactionType::Expense.as_str().to_owned(),
            date: today.to_string(),
            ..Default::default()
        }
    }

    /// Check every field and build the normalised transaction.
    ///
    /// All fields are checked, so the errors cover every invalid field rather
    /// than just the first one.
    pub fn validate(&self) -> Result<NewTransaction, FormErrors> {
        let mut errors = FormErrors::default();

        let transaction_type = TransactionType::parse(self.transaction_type.trim());
        if transaction_type.is_none() {
            errors.transaction_type = Some(INVALID_TYPE_MSG);
        }

        let concept = self.concept.trim();
        if concept.graphemes(true).count() < CONCEPT_MIN_LENGTH {
            errors.concept = Some(CONCEPT_TOO_SHORT_MSG);
        }

        let amount = match self.amount.trim().parse::<f64>() {
            Ok(amount) if !amount.is_finite() => {
                errors.amount = Some(INVALID_AMOUNT_MSG);
                None
            }
            Ok(amount) if amount < 0.0 => {
                errors.amount = Some(NEGATIVE_AMOUNT_MSG);
                None
            }
            Ok(amount) => Some(amount),
            Err(_) => {
                errors.amount = Some(INVALID_AMOUNT_MSG);
                None
            }
        };

        let date = match Date::parse(self.date.trim(), format_description!("[year]-[month]-[day]"))
        {
            Ok(date) => Some(date),
            Err(_) => {
                errors.date = Some(INVALID_DATE_MSG);
                None
            }
        };

        let category_id = match self.category_id.trim() {
            "" => Ok(None),
            raw => raw.parse().map(Some),
        };
        if category_id.is_err() {
            errors.category_id = Some(INVALID_CATEGORY_MSG);
        }

        let description = Some(self.description.trim())
            .filter(|description| !description.is_empty())
            .map(str::to_owned);

        match (transaction_type, amount, date, category_id) {
            (Some(transaction_type), Some(amount), Some(date), Ok(category_id))
                if errors.is_empty() =>
            {
                Ok(NewTransaction {
                    transaction_type,
                    concept: concept.to_owned(),
                    description,
                    amount,
                    date,
                    category_id,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Transaction> for RawTransactionForm {
    fn from(transaction: &Transaction) -> Self {
        Self {
            transaction_type: transaction.transaction_type.as_str().to_owned(),
            concept: transaction.concept.clone(),
            description: transaction.description.clone().unwrap_or_default(),
            amount: transaction.amount.to_string(),
            date: transaction.date.to_string(),
            category_id: transaction
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Where the form is submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormAction {
    Create,
    Update(TransactionId),
}

/// The ID of the element that validation errors replace the contents of.
pub const FORM_CONTAINER_ID: &str = "transaction-form-container";

/// Render the transaction form with `values` filled in and `errors` shown
/// under their fields.
///
/// Responses with status 422 replace the form, all other errors go to the
/// alert container.
pub fn transaction_form_view(
    values: &RawTransactionForm,
    errors: &FormErrors,
    categories: &[Category],
    action: FormAction,
) -> Markup {
    let (hx_post, hx_put, submit_label) = match action {
        FormAction::Create => (Some(endpoints::TRANSACTIONS_API.to_owned()), None, "Guardar"),
        FormAction::Update(id) => (
            None,
            Some(endpoints::format_endpoint(endpoints::TRANSACTION, id)),
            "Actualizar",
        ),
    };
    let is_income = values.transaction_type == TransactionType::Income.as_str();
    let is_expense = values.transaction_type == TransactionType::Expense.as_str();
    let target_422 = format!("#{FORM_CONTAINER_ID}");

    let field_error = |error: Option<&str>| {
        html! {
            @if let Some(error) = error {
                p class=(FORM_ERROR_STYLE) { (error) }
            }
        }
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-422=(target_422)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Tipo" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    div class="flex items-center gap-3 w-full"
                    {
                        input
                            name="type"
                            id="transaction-type-income"
                            type="radio"
                            value=(TransactionType::Income.as_str())
                            checked[is_income]
                            required
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for="transaction-type-income" class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (TransactionType::Income.label())
                        }
                    }

                    div class="flex items-center gap-3 w-full"
                    {
                        input
                            name="type"
                            id="transaction-type-expense"
                            type="radio"
                            value=(TransactionType::Expense.as_str())
                            checked[is_expense]
                            required
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for="transaction-type-expense" class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (TransactionType::Expense.label())
                        }
                    }
                }

                (field_error(errors.transaction_type))
            }

            div
            {
                label for="concept" class=(FORM_LABEL_STYLE) { "Concepto" }

                input
                    name="concept"
                    id="concept"
                    type="text"
                    placeholder="Mercado semanal"
                    value=(values.concept)
                    minlength=(CONCEPT_MIN_LENGTH)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.concept))
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Descripción (opcional)" }

                input
                    name="description"
                    id="description"
                    type="text"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Monto" }

                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="any"
                        min="0"
                        placeholder="0"
                        value=(values.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (field_error(errors.amount))
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Fecha" }

                input
                    name="date"
                    id="date"
                    type="date"
                    value=(values.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.date))
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Categoría" }

                select name="category_id" id="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[values.category_id.is_empty()] { "Sin categoría" }

                    @for category in categories {
                        @let value = category.id.to_string();
                        option value=(value) selected[value == values.category_id]
                        {
                            @if let Some(icon) = &category.icon { (icon) " " }
                            (category.name)
                        }
                    }
                }

                (field_error(errors.category_id))
            }

            button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" { (loading_spinner()) }
                " " (submit_label)
            }
        }
    }
}

/// The form re-rendered with its field errors, for HTMX to swap in place of
/// the submitted form.
pub fn invalid_form_response(
    values: &RawTransactionForm,
    errors: &FormErrors,
    categories: &[Category],
    action: FormAction,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        transaction_form_view(values, errors, categories, action),
    )
        .into_response()
}

/// The alert shown when a valid transaction could not be saved.
pub fn save_failed_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Alert::Error {
            message: "No se pudo guardar la transacción".to_owned(),
            details: "Inténtalo de nuevo más tarde.".to_owned(),
        },
    )
        .into_response()
}

/// The full page around a transaction form.
pub fn transaction_form_page(title: &str, form: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h2 class="text-xl font-bold" { (title) }

                div id=(FORM_CONTAINER_ID) { (form) }
            }
        }
    };

    base(title, &[dollar_input_styles()], &content)
}


#[cfg(test)]
mod form_view_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        category::{Category, CategoryColor, CategoryName},
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_input_with_value,
            assert_form_submit_button, assert_hx_endpoint, assert_valid_html, must_get_form,
        },
    };

    use super::{
        CONCEPT_TOO_SHORT_MSG, FormAction, FormErrors, RawTransactionForm, transaction_form_view,
    };

    fn categories() -> Vec<Category> {
        vec![Category {
            id: 3,
            name: CategoryName::new_unchecked("Hogar"),
            color: CategoryColor::new_unchecked("#f97316"),
            icon: None,
        }]
    }

    #[test]
    fn create_form_has_all_fields() {
        let markup = transaction_form_view(
            &RawTransactionForm::empty(date!(2023 - 07 - 05)),
            &FormErrors::default(),
            &categories(),
            FormAction::Create,
        );

        let html = Html::parse_fragment(&markup.into_string());
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "type", "radio");
        assert_form_input(&form, "concept", "text");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input_with_value(&form, "date", "2023-07-05");
        assert_form_input(&form, "category_id", "select");
        assert_form_submit_button(&form);
    }

    #[test]
    fn edit_form_puts_to_transaction() {
        let markup = transaction_form_view(
            &RawTransactionForm::empty(date!(2023 - 07 - 05)),
            &FormErrors::default(),
            &[],
            FormAction::Update(42),
        );

        let html = Html::parse_fragment(&markup.into_string());
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/transactions/42", "hx-put");
    }

    #[test]
    fn shows_field_errors_and_submitted_values() {
        let values = RawTransactionForm {
            concept: "ab".to_owned(),
            category_id: "3".to_owned(),
            ..RawTransactionForm::empty(date!(2023 - 07 - 05))
        };
        let errors = FormErrors {
            concept: Some(CONCEPT_TOO_SHORT_MSG),
            ..Default::default()
        };

        let markup = transaction_form_view(&values, &errors, &categories(), FormAction::Create);

        let html = Html::parse_fragment(&markup.into_string());
        assert_form_error_message(&html, CONCEPT_TOO_SHORT_MSG);
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "concept", "ab");
        let selected: Vec<_> = html
            .select(&Selector::parse("option[selected]").unwrap())
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(selected, ["3"]);
    }
}
