//! The page shown for unknown routes and missing resources.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for the 404 fallback.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "No encontrado",
        "404",
        "No encontramos la página que buscas.",
        "Revisa la dirección o vuelve al inicio.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}

#[cfg(test)]
mod not_found_tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_404_not_found;

    #[tokio::test]
    async fn renders_404_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let title = scraper::Selector::parse("title").unwrap();
        let title = document.select(&title).next().unwrap();
        assert_eq!(title.text().collect::<String>(), "No encontrado - Cappih");
    }
}
