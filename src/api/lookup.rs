use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::Query;
use crate::infrastructure::AppState;
use crate::api::search::parse_limit;
use crate::openlibrary::{LookupQuery, LookupResult};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LookupParams {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    #[param(value_type = Option<usize>)]
    pub limit: Option<String>,
}

impl LookupParams {
    fn into_query(self) -> Option<LookupQuery> {
        let limit = parse_limit(self.limit.as_deref());
        let pick = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        if let Some(isbn) = pick(self.isbn) {
            Some(LookupQuery::Isbn(isbn))
        } else if let Some(query) = pick(self.title) {
            Some(LookupQuery::Title { query, limit })
        } else {
            pick(self.author).map(|query| LookupQuery::Author { query, limit })
        }
    }
}

/// Tagged lookup: `{"kind": "single", "book": …}` or
/// `{"kind": "list", "books": […]}`.
#[utoipa::path(
    get,
    path = "/api/lookup",
    params(LookupParams),
    responses(
        (status = 200, description = "Single book for an ISBN, otherwise a list"),
        (status = 400, description = "No query given"),
        (status = 502, description = "Open Library request failed")
    )
)]
pub async fn lookup_book(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> ApiResult<Json<LookupResult>> {
    let query = params
        .into_query()
        .ok_or_else(|| ApiError::BadRequest("Provide isbn, title or author".to_string()))?;

    Ok(Json(state.lookup.lookup(query).await?))
}
