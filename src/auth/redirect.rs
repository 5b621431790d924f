//! Builds the `redirect_url` that sends users back to where they were after
//! signing in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Only same-origin paths are allowed, and never the auth pages themselves.
fn is_safe_redirect_target(path_and_query: &str) -> bool {
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return false;
    }

    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW && path != endpoints::SIGN_UP_VIEW
}

/// Reduce `raw_url` to a safe, relative path and query.
///
/// Returns `None` for absolute URLs, protocol-relative URLs and the log-in
/// or sign-up pages.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

/// `HX-Current-URL` holds the full URL of the page, so only its path is kept.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that returns the user to `request`'s page after
/// signing in.
///
/// Page requests return to their own URL. HTMX requests to `/api` return to
/// the page that made the request.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        let path_and_query = request.uri().path_and_query()?.as_str();
        normalize_redirect_url(path_and_query)?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

/// The log-in page URL with `redirect_target` as the `redirect_url` query parameter.
pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let redirect_url = normalize_hx_current_url(current_url);
    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod redirect_tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_relative_path_and_query() {
        assert_eq!(
            normalize_redirect_url("/transactions?filter=income&sort_by=amount"),
            Some("/transactions?filter=income&sort_by=amount".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_auth_urls() {
        let cases = [
            "https://evil.example/dashboard",
            "//evil.example/dashboard",
            "dashboard",
            endpoints::LOG_IN_VIEW,
            endpoints::SIGN_UP_VIEW,
        ];

        for raw_url in cases {
            assert_eq!(normalize_redirect_url(raw_url), None, "for {raw_url}");
        }
    }

    #[test]
    fn page_request_redirects_back_to_page() {
        let request = Request::builder()
            .uri("/transactions?filter=expense")
            .body(Body::empty())
            .unwrap();

        let redirect_url = build_log_in_redirect_url(&request);

        assert_eq!(
            redirect_url,
            Some("/log_in?redirect_url=%2Ftransactions%3Ffilter%3Dexpense".to_owned())
        );
    }

    #[test]
    fn api_request_without_htmx_headers_has_no_redirect() {
        let request = Request::builder()
            .uri("/api/transactions")
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }

    #[test]
    fn api_request_redirects_back_to_current_page() {
        let request = Request::builder()
            .uri("/api/transactions")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "https://cappih.example/transactions/new")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some("/log_in?redirect_url=%2Ftransactions%2Fnew".to_owned())
        );
    }
}
