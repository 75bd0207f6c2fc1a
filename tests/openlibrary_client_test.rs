use shelfmark::openlibrary::{LookupError, LookupQuery, LookupResult, OpenLibraryClient, SearchField};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenLibraryClient {
    OpenLibraryClient::new(
        server.uri(),
        "https://covers.openlibrary.org",
        Duration::from_secs(2),
    )
}

#[tokio::test]
async fn test_isbn_lookup_returns_candidate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/books"))
        .and(query_param("bibkeys", "ISBN:9780441013593"))
        .and(query_param("jscmd", "data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ISBN:9780441013593": {
                "title": "Dune",
                "authors": [{ "name": "Frank Herbert" }],
                "publish_date": "2005",
                "cover": {
                    "small": "https://covers.openlibrary.org/b/id/1-S.jpg",
                    "large": "https://covers.openlibrary.org/b/id/1-L.jpg"
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let book = client
        .lookup_isbn("978-0441013593")
        .await
        .expect("lookup failed")
        .expect("book missing");

    assert_eq!(book.title, "Dune");
    assert_eq!(book.author_line(), "Frank Herbert");
    assert_eq!(
        book.cover_url.as_deref(),
        Some("https://covers.openlibrary.org/b/id/1-L.jpg")
    );
    assert_eq!(book.publish_date.as_deref(), Some("2005"));
}

#[tokio::test]
async fn test_unknown_isbn_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.lookup_isbn("0000000000").await.unwrap().is_none());

    let result = client
        .lookup(LookupQuery::Isbn("0000000000".to_string()))
        .await
        .unwrap();
    assert_eq!(result, LookupResult::Single { book: None });
}

#[tokio::test]
async fn test_title_search_keeps_ranking_and_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("title", "dune messiah"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "numFound": 3,
            "docs": [
                { "title": "Dune Messiah", "author_name": ["Frank Herbert"], "cover_i": 11 },
                { "title": "Dune", "author_name": ["Frank Herbert"], "first_publish_year": 1965 },
                { "title": "Dune Encyclopedia" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let results = client
        .search(SearchField::Title, "dune messiah", 2)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Dune Messiah");
    assert_eq!(
        results[0].cover_url.as_deref(),
        Some("https://covers.openlibrary.org/b/id/11-L.jpg")
    );
    assert_eq!(results[1].title, "Dune");
    assert_eq!(results[1].publish_date.as_deref(), Some("1965"));
}

#[tokio::test]
async fn test_author_search_through_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("author", "Jane Austen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "docs": [{ "title": "Emma", "author_name": ["Jane Austen"] }]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .lookup(LookupQuery::Author {
            query: "Jane Austen".to_string(),
            limit: 10,
        })
        .await
        .unwrap();

    match result {
        LookupResult::List { books } => {
            assert_eq!(books.len(), 1);
            assert_eq!(books[0].authors, vec!["Jane Austen"]);
        }
        other => panic!("expected a list, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upstream_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .search(SearchField::Author, "Herbert", 10)
        .await
        .unwrap_err();

    match err {
        LookupError::Status(status) => assert_eq!(status.as_u16(), 503),
        other => panic!("unexpected error {:?}", other),
    }
}
