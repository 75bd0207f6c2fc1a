use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::search::search_books,
        api::books::list_books,
        api::books::get_book,
        api::books::create_book,
        api::books::update_book,
        api::books::delete_book,
        api::books::prefill,
        api::books::list_conditions,
        api::books::submit_form,
        api::lookup::lookup_book,
        api::covers::search_covers,
        api::covers::upload_cover,
        api::views::table,
        api::views::grid,
        api::events::event_stream,
    ),
    components(
        schemas(
            crate::models::Book,
            crate::models::BookFormValues,
            api::books::BookListResponse,
        )
    ),
    tags(
        (name = "shelfmark", description = "Shelfmark library catalogue API")
    )
)]
pub struct ApiDoc;
