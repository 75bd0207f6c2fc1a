use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{self, Path, Query};
use crate::infrastructure::AppState;
use crate::models::book::CONDITIONS;
use crate::models::{Book, BookFormValues, CoverUpload};
use crate::views::{DeleteConfirmation, delete_prompt};

#[derive(Debug, Serialize, ToSchema)]
pub struct BookListResponse {
    pub books: Vec<Book>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub confirm: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "All books, newest first", body = BookListResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> ApiResult<Json<BookListResponse>> {
    let books = state.books.list().await?;
    Ok(Json(BookListResponse {
        total: books.len(),
        books: books.to_vec(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "No such book")
    )
)]
pub async fn get_book(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<Book>> {
    Ok(Json(state.books.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = BookFormValues,
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    extract::Json(mut form): extract::Json<BookFormValues>,
) -> ApiResult<impl IntoResponse> {
    form.id = None;
    let book = state.books.submit(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Book created successfully",
            "book": book
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    request_body = BookFormValues,
    responses(
        (status = 200, description = "Book updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such book")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    extract::Json(mut form): extract::Json<BookFormValues>,
) -> ApiResult<impl IntoResponse> {
    form.id = Some(id);
    let book = state.books.submit(form).await?;

    Ok(Json(json!({
        "message": "Book updated successfully",
        "book": book
    })))
}

/// Deletes only with `?confirm=true`; anything else is a no-op that echoes
/// the confirmation prompt.
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(
        ("id" = i32, Path, description = "Book id"),
        ("confirm" = Option<bool>, Query, description = "Must be true to delete")
    ),
    responses(
        (status = 200, description = "Deleted, or declined without changes"),
        (status = 404, description = "No such book")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<impl IntoResponse> {
    let confirmation = DeleteConfirmation::from_flag(params.confirm.unwrap_or(false));
    if !confirmation.is_confirmed() {
        let book = state.books.get(id).await?;
        return Ok(Json(json!({
            "deleted": false,
            "confirm": delete_prompt(&book.title)
        })));
    }

    let deleted = state.books.delete(id, confirmation).await?;
    Ok(Json(json!({
        "deleted": deleted,
        "message": "Book deleted successfully"
    })))
}

/// Condition grades offered by the form's select.
#[utoipa::path(
    get,
    path = "/api/books/conditions",
    responses((status = 200, description = "Condition grades"))
)]
pub async fn list_conditions() -> Json<serde_json::Value> {
    Json(json!({ "conditions": CONDITIONS }))
}

/// Fill title and author from the form's ISBN. Values come back unchanged
/// when Open Library has no match.
#[utoipa::path(
    post,
    path = "/api/books/prefill",
    request_body = BookFormValues,
    responses(
        (status = 200, description = "Form values, prefilled when the ISBN is known", body = BookFormValues),
        (status = 502, description = "Open Library request failed")
    )
)]
pub async fn prefill(
    State(state): State<AppState>,
    extract::Json(form): extract::Json<BookFormValues>,
) -> ApiResult<Json<BookFormValues>> {
    Ok(Json(state.books.prefill_from_isbn(form).await?))
}

/// Multipart form submission: the text fields plus an optional `cover` file.
/// An `id` field switches to update.
#[utoipa::path(
    post,
    path = "/api/books/form",
    request_body(content = String, content_type = "multipart/form-data", description = "Book fields plus an optional `cover` file"),
    responses(
        (status = 201, description = "Book created"),
        (status = 200, description = "Book updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such book"),
        (status = 415, description = "HEIC upload without HEIC support")
    )
)]
pub async fn submit_form(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_form(multipart).await?;
    let status = if form.is_edit() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    let book = state.books.submit(form).await?;
    Ok((status, Json(json!({ "book": book }))))
}

/// Pull form values out of a multipart body.
pub async fn read_form(mut multipart: Multipart) -> ApiResult<BookFormValues> {
    let mut form = BookFormValues::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "cover" {
            let file_name = field.file_name().unwrap_or("cover").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            form.cover = Some(CoverUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        match name.as_str() {
            "id" => {
                let id = value.trim();
                if !id.is_empty() {
                    form.id = Some(
                        id.parse()
                            .map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", id)))?,
                    );
                }
            }
            "isbn" => form.isbn = Some(value),
            "title" => form.title = value,
            "author" => form.author = value,
            "edition" => form.edition = Some(value),
            "condition" => form.condition = Some(value),
            "notes" => form.notes = Some(value),
            "selected_cover_url" => form.selected_cover_url = Some(value),
            other => tracing::debug!("Ignoring unknown form field {}", other),
        }
    }

    Ok(form)
}
