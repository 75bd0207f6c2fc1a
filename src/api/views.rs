//! Rendered table and grid views over the cached book list.

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::Query;
use crate::infrastructure::AppState;
use crate::views::{CoverCard, SortColumn, SortDirection, SortState, TableView, grid_view, table_view};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TableParams {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

impl TableParams {
    fn sort_state(&self) -> Result<SortState, ApiError> {
        let Some(name) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(SortState::default());
        };
        let column = SortColumn::parse(name)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown sort column: {}", name)))?;
        let direction = match self.dir.as_deref() {
            Some(dir) => SortDirection::parse(dir)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown sort direction: {}", dir)))?,
            None => SortDirection::Asc,
        };
        Ok(SortState::new(column, direction))
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GridParams {
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/views/table",
    params(TableParams),
    responses(
        (status = 200, description = "Filtered and sorted table rows"),
        (status = 400, description = "Unknown sort column or direction")
    )
)]
pub async fn table(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> ApiResult<Json<TableView>> {
    let sort = params.sort_state()?;
    let books = state.books.list().await?;
    Ok(Json(table_view(
        &books,
        params.q.as_deref().unwrap_or_default(),
        sort,
    )))
}

#[utoipa::path(
    get,
    path = "/api/views/grid",
    params(GridParams),
    responses((status = 200, description = "Filtered cover cards"))
)]
pub async fn grid(
    State(state): State<AppState>,
    Query(params): Query<GridParams>,
) -> ApiResult<Json<Vec<CoverCard>>> {
    let books = state.books.list().await?;
    Ok(Json(grid_view(&books, params.q.as_deref().unwrap_or_default())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sort: Option<&str>, dir: Option<&str>) -> TableParams {
        TableParams {
            q: None,
            sort: sort.map(str::to_string),
            dir: dir.map(str::to_string),
        }
    }

    #[test]
    fn test_sort_params() {
        assert_eq!(params(None, None).sort_state().unwrap(), SortState::default());
        assert_eq!(
            params(Some("author"), Some("desc")).sort_state().unwrap(),
            SortState::new(SortColumn::Author, SortDirection::Desc)
        );
        assert_eq!(
            params(Some("title"), None).sort_state().unwrap(),
            SortState::new(SortColumn::Title, SortDirection::Asc)
        );
        assert!(params(Some("colour"), None).sort_state().is_err());
        assert!(params(Some("title"), Some("up")).sort_state().is_err());
    }
}
