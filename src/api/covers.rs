use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::Query;
use crate::infrastructure::AppState;
use crate::models::CoverUpload;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoverSearchParams {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Candidate cover URLs, ISBN cover first, without duplicates.
#[utoipa::path(
    get,
    path = "/api/covers/search",
    params(CoverSearchParams),
    responses((status = 200, description = "Candidate cover URLs"))
)]
pub async fn search_covers(
    State(state): State<AppState>,
    Query(params): Query<CoverSearchParams>,
) -> impl IntoResponse {
    let covers = state
        .covers
        .search_covers(
            params.isbn.as_deref(),
            params.title.as_deref(),
            params.author.as_deref(),
        )
        .await;

    Json(json!({ "covers": covers }))
}

#[utoipa::path(
    post,
    path = "/api/covers/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "A `cover` image file"),
    responses(
        (status = 201, description = "Stored cover URL"),
        (status = 400, description = "Missing, empty or non-image file"),
        (status = 415, description = "HEIC upload without HEIC support")
    )
)]
pub async fn upload_cover(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("cover") {
            continue;
        }

        let upload = CoverUpload {
            file_name: field.file_name().unwrap_or("cover").to_string(),
            content_type: field.content_type().map(str::to_string),
            bytes: field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?
                .to_vec(),
        };

        let url = state.covers.upload_cover(&upload).await?;
        tracing::info!("Stored cover {} as {}", upload.file_name, url);
        return Ok((StatusCode::CREATED, Json(json!({ "url": url }))));
    }

    Err(ApiError::BadRequest("Missing 'cover' file".to_string()))
}
