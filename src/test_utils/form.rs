use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let hx_attribute = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        hx_attribute, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {hx_attribute:?}"
    );
}

fn find_input<'a>(form: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    form.select(&Selector::parse("input, select").unwrap())
        .find(|input| input.value().attr("name") == Some(name))
}

/// Assert the form has an input called `name` of type `type_`.
///
/// Radio groups and selects are matched by name only, pass "radio" or
/// "select" as the type.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = find_input(form, name)
        .unwrap_or_else(|| panic!("No input found with name \"{name}\" and type \"{type_}\""));

    let input_type = if input.value().name() == "select" {
        "select"
    } else {
        input.value().attr("type").unwrap_or_default()
    };

    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(form: &ElementRef<'_>, name: &str, value: &str) {
    let input = find_input(form, name)
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""));
    let input_value = input.value().attr("value").unwrap_or_default();

    assert_eq!(
        input_value, value,
        "want input {name} with value \"{value}\", got {input_value:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button[type=submit]").unwrap())
        .next();

    assert!(submit_button.is_some(), "want a button with type=\"submit\"");
}

/// Assert that one of the red error messages in `html` reads `want_error_message`.
#[track_caller]
pub(crate) fn assert_form_error_message(html: &Html, want_error_message: &str) {
    let selector = Selector::parse("p.text-red-500").unwrap();
    let error_messages: Vec<String> = html
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_owned())
        .collect();

    assert!(
        error_messages.iter().any(|message| message == want_error_message),
        "want error message \"{want_error_message}\", got {error_messages:?}"
    );
}
