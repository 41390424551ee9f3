//! Integration tests for the API client.
//!
//! These tests run each endpoint against a mock literature service.

use literature_core::api::ListQuery;
use literature_core::{ApiClient, ApiError, ClientConfig, UploadFile};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ClientConfig::with_base_url(server.uri())).expect("client should build")
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "code": 200, "message": "success", "data": data, "timestamp": 1_700_000_000_000_i64 })
}

#[tokio::test]
async fn test_list_sends_pagination_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/list"))
        .and(query_param("page", "2"))
        .and(query_param("size", "5"))
        .and(query_param("category", "ml"))
        .and(query_param("readingGuide", ""))
        .and(query_param("tags", "nlp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "records": [
                { "id": 7, "title": "Attention", "fileSize": 2048, "category": "ml" },
                { "id": 8, "originalFileName": "bert.pdf" }
            ],
            "total": 12,
            "current": 2,
            "size": 5,
            "pages": 3
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery {
        page: 2,
        size: 5,
        category: "ml".to_string(),
        tags: "nlp".to_string(),
        ..ListQuery::default()
    };
    let page = client_for(&server).list(&query).await.expect("list should succeed");

    assert_eq!(page.total, 12);
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[0].display_title(), "Attention");
    assert_eq!(page.records[0].file_size_readable(), "2.0 KB");
    assert_eq!(page.records[1].display_title(), "bert.pdf");
}

#[tokio::test]
async fn test_list_envelope_failure_code_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 500,
            "message": "database unavailable",
            "data": null
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list(&ListQuery { page: 1, size: 10, ..ListQuery::default() })
        .await
        .unwrap_err();

    match &err {
        ApiError::Server { code, message, .. } => {
            assert_eq!(*code, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Server error, got {other:?}"),
    }
    assert_eq!(err.server_message(), Some("database unavailable"));
}

#[tokio::test]
async fn test_http_error_keeps_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;

    let err = client_for(&server).detail(99).await.unwrap_err();

    assert!(
        matches!(err, ApiError::HttpStatus { status: 404, .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.server_message(), Some("not found"));
}

#[tokio::test]
async fn test_http_error_without_body_has_no_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/3"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server).detail(3).await.unwrap_err();

    assert!(matches!(err, ApiError::HttpStatus { status: 502, .. }));
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn test_detail_accepts_bare_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "title": "Bare",
            "publishYear": 2019
        })))
        .mount(&server)
        .await;

    let literature = client_for(&server).detail(5).await.expect("detail should succeed");

    assert_eq!(literature.id, 5);
    assert_eq!(literature.publish_year, Some(2019));
}

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/literature/upload"))
        .and(header_exists("content-type"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"notes.txt\""))
        .and(body_string_contains("hello library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 31,
            "originalFileName": "notes.txt"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let file = UploadFile::new("notes.txt", b"hello library".to_vec());
    let literature = client_for(&server).upload(&file).await.expect("upload should succeed");

    assert_eq!(literature.id, 31);
}

#[tokio::test]
async fn test_start_batch_import_sends_one_part_per_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/literature/batch-import"))
        .and(body_string_contains("filename=\"a.pdf\""))
        .and(body_string_contains("filename=\"b.pdf\""))
        .and(body_string_contains("name=\"files\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "importId": "job-7"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let files = vec![
        UploadFile::new("a.pdf", b"%PDF-a".to_vec()),
        UploadFile::new("b.pdf", b"%PDF-b".to_vec()),
    ];
    let ticket = client_for(&server)
        .start_batch_import(&files)
        .await
        .expect("batch import should be accepted");

    assert_eq!(ticket.import_id, "job-7");
}

#[tokio::test]
async fn test_download_uses_content_disposition_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/download/4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    "attachment; filename*=UTF-8''%E8%AE%BA%E6%96%87.pdf",
                )
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .mount(&server)
        .await;

    let file = client_for(&server).download(4).await.expect("download should succeed");

    assert_eq!(file.file_name, "论文.pdf");
    assert_eq!(file.bytes, b"%PDF-1.7");
}

#[tokio::test]
async fn test_download_without_header_uses_default_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/download/4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"raw".to_vec()))
        .mount(&server)
        .await;

    let file = client_for(&server).download(4).await.expect("download should succeed");

    assert_eq!(file.file_name, "document");
}

#[tokio::test]
async fn test_delete_accepts_empty_and_envelope_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/literature/1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/literature/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .mount(&server)
        .await;

    let api = client_for(&server);
    api.delete(1).await.expect("empty body should be accepted");
    api.delete(2).await.expect("success envelope should be accepted");
}

#[tokio::test]
async fn test_delete_envelope_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/literature/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 403,
            "message": "forbidden"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).delete(9).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { code: 403, .. }));
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/literature/1"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": 1 }))))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).detail(1).await.expect("detail should succeed");
}
