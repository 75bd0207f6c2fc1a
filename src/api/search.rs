//! Proxy to Open Library used by the search page.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::extract::Query;
use crate::infrastructure::AppState;
use crate::openlibrary::{DEFAULT_SEARCH_LIMIT, LookupError, SearchField};

#[derive(Debug, Deserialize, Clone, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Result cap for title and author searches; unparseable values use the default.
    #[param(value_type = Option<usize>)]
    pub limit: Option<String>,
}

/// Lenient `limit` parsing shared by the search and lookup routes.
pub(crate) fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn upstream_failure(e: LookupError) -> axum::response::Response {
    tracing::error!("API Error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to process your request" })),
    )
        .into_response()
}

/// `?isbn=` returns `{"book": …}`; `?title=` or `?author=` returns
/// `{"results": […]}`.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Lookup or search results"),
        (status = 400, description = "No query given"),
        (status = 500, description = "Open Library request failed")
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    if let Some(isbn) = non_blank(&params.isbn) {
        return match state.lookup.lookup_isbn(isbn).await {
            Ok(book) => (StatusCode::OK, Json(json!({ "book": book }))).into_response(),
            Err(e) => upstream_failure(e),
        };
    }

    let (field, query) = match (non_blank(&params.title), non_blank(&params.author)) {
        (Some(title), _) => (SearchField::Title, title),
        (None, Some(author)) => (SearchField::Author, author),
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Provide isbn, title or author" })),
            )
                .into_response();
        }
    };

    let limit = parse_limit(params.limit.as_deref());
    match state.lookup.search(field, query, limit).await {
        Ok(results) => (StatusCode::OK, Json(json!({ "results": results }))).into_response(),
        Err(e) => upstream_failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_falls_back_to_default() {
        assert_eq!(parse_limit(Some("25")), 25);
        assert_eq!(parse_limit(Some(" 3 ")), 3);
        assert_eq!(parse_limit(None), DEFAULT_SEARCH_LIMIT);
        assert_eq!(parse_limit(Some("abc")), DEFAULT_SEARCH_LIMIT);
        assert_eq!(parse_limit(Some("-1")), DEFAULT_SEARCH_LIMIT);
        assert_eq!(parse_limit(Some("0")), DEFAULT_SEARCH_LIMIT);
    }
}
