use rag_console::api::{ApiClient, QueryMode, QueryRequest, UploadResponse};
use rag_console::core::config::{ClientConfig, QueryOptions};
use rag_console::core::errors::ClientError;
use rag_console::upload::{FileCategory, UploadFile, UploadHandler};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ClientConfig::for_base_url(server.uri())).unwrap()
}

#[tokio::test]
async fn query_exposes_answer_and_citations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "query": "What is in the report?",
            "num_results": 5,
            "include_web_search": true,
            "include_drive_search": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Quarterly revenue.",
            "citations": [{
                "id": "c1",
                "source_type": "document",
                "title": "report.pdf",
                "content": "Revenue grew",
                "page_number": 3,
                "confidence_score": 0.91
            }],
            "confidence_score": 0.88,
            "processing_time_ms": 412.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).query("What is in the report?").await.unwrap();
    assert_eq!(response.answer, "Quarterly revenue.");
    assert_eq!(response.citations.len(), 1);
    assert_eq!(response.citations[0].page_number, Some(3));
    assert!((response.confidence_score - 0.88).abs() < 1e-9);
}

#[tokio::test]
async fn multimodal_mode_uses_its_own_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/multimodal/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "See the chart.",
            "citations": [],
            "confidence_score": 0.7,
            "processing_time_ms": 10,
            "metadata": {
                "multimodal_enhancement": true,
                "visual_links": [{"visual_id": "img-1", "relationship": "explains", "confidence": 0.9}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = QueryRequest::new("chart?", &QueryOptions::default());
    let response = client_for(&server)
        .query_with(&request, QueryMode::MultiModal)
        .await
        .unwrap();
    assert_eq!(response.answer, "See the chart.");
    assert!(response.metadata.contains_key("visual_links"));
}

#[tokio::test]
async fn error_status_surfaces_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "server error"})))
        .mount(&server)
        .await;

    let err = client_for(&server).query("anything").await.unwrap_err();
    assert_eq!(err.to_string(), "server error");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn error_status_without_body_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).health().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 503");
}

#[tokio::test]
async fn delete_issues_exactly_one_request_and_returns_payload() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/documents/doc-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Document doc-42 deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).delete_document("doc-42").await.unwrap();
    assert!(response.success);
    assert_eq!(response.message.as_deref(), Some("Document doc-42 deleted"));
}

#[tokio::test]
async fn delete_rejects_blank_id_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).delete_document("  ").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));
}

#[tokio::test]
async fn list_documents_accepts_both_envelopes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"document_id": "a1", "filename": "report.pdf"},
                "b2"
            ]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "c3"}])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.list_documents().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, "a1");
    assert_eq!(first[0].filename.as_deref(), Some("report.pdf"));
    assert_eq!(first[1].id, "b2");

    let second = client.list_documents().await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, "c3");
}

#[tokio::test]
async fn health_accepts_boolean_services() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "services": {"rag": true, "stt": false, "vector_db": "connected"}
        })))
        .mount(&server)
        .await;

    let health = client_for(&server).health().await.unwrap();
    assert!(health.is_healthy());
    assert!(health.services["rag"].is_up());
    assert!(!health.services["stt"].is_up());
    assert!(health.services["vector_db"].is_up());
}

#[tokio::test]
async fn visual_links_and_chart_list_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/multimodal/visual-links/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document_id": "doc-1",
            "visual_text_links": [
                {"visual_id": "img-1", "relationship": "describes", "confidence": 0.8, "text_snippets": ["Figure 1"]}
            ],
            "total_links": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/multimodal/charts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "charts": [{"id": "chart-1", "type": "line", "confidence": 0.9, "facts_count": 4, "description_preview": "Sales"}],
            "total_count": 1
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let links = client.visual_links("doc-1").await.unwrap();
    assert_eq!(links.total_links, 1);
    assert_eq!(links.visual_text_links[0].text_snippets, vec!["Figure 1"]);

    let charts = client.list_charts().await.unwrap();
    assert_eq!(charts.charts[0].chart_type, "line");
    assert_eq!(charts.charts[0].facts_count, 4);
}

#[tokio::test]
async fn upload_handler_routes_categories_to_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "document_id": "doc-9",
            "text_chunks": 12
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze/chart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart_type": "bar",
            "queryable_facts": ["Q1 was 10"],
            "confidence": 0.8
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pdf = UploadFile::new("report.pdf", "application/pdf", b"%PDF-1.4".to_vec());
    let chart = UploadFile::new("sales_chart.png", "image/png", vec![0x89, 0x50]);

    let doc = client.upload(&pdf, FileCategory::Document).await.unwrap();
    assert!(matches!(doc, UploadResponse::Document(ref d) if d.document_id.as_deref() == Some("doc-9")));

    let analysis = client.upload(&chart, FileCategory::Chart).await.unwrap();
    assert_eq!(analysis.chart_analysis().unwrap().chart_type, "bar");
}

#[tokio::test]
async fn unsuccessful_document_upload_becomes_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Unsupported file"
        })))
        .mount(&server)
        .await;

    let pdf = UploadFile::new("broken.pdf", "application/pdf", vec![]);
    let err = client_for(&server)
        .upload(&pdf, FileCategory::Document)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported file");
}

#[tokio::test]
async fn search_accepts_bare_array_and_results_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"query": "pumps", "num_results": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r1", "content": "Centrifugal pumps"},
            {"id": "r2", "content": "Valve sizing"}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "r3"}],
            "total": 1
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let options = QueryOptions {
        num_results: 3,
        ..QueryOptions::default()
    };
    let request = QueryRequest::new("pumps", &options);

    let bare = client.search(&request).await.unwrap();
    assert_eq!(bare.len(), 2);
    assert_eq!(bare[1]["content"], "Valve sizing");

    let wrapped = client.search(&request).await.unwrap();
    assert_eq!(wrapped.len(), 1);
    assert_eq!(wrapped[0]["id"], "r3");
}

#[tokio::test]
async fn citation_id_is_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/citation/doc%201%2Fp3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc 1/p3",
            "title": "Manual",
            "page_number": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let citation = client_for(&server).citation("doc 1/p3").await.unwrap();
    assert_eq!(citation["title"], "Manual");
    assert_eq!(citation["page_number"], 3);
}

#[tokio::test]
async fn missing_citation_surfaces_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/citation/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Citation not found"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).citation("nope").await.unwrap_err();
    assert_eq!(err.to_string(), "Citation not found");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn chart_upload_with_mixed_facts_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/chart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart_type": "bar",
            "queryable_facts": ["Q1 was 10", {"insight": "Q2 spike"}, 42],
            "confidence": 0.7
        })))
        .mount(&server)
        .await;

    let chart = UploadFile::new("sales_chart.png", "image/png", vec![0x89]);
    let response = client_for(&server)
        .upload(&chart, FileCategory::Chart)
        .await
        .unwrap();
    assert_eq!(response.chart_analysis().unwrap().queryable_facts.len(), 3);
}

#[tokio::test]
async fn image_caption_failure_becomes_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "captions": {"error": "Caption generation failed"},
            "filename": "pump.png"
        })))
        .mount(&server)
        .await;

    let image = UploadFile::new("pump.png", "image/png", vec![0x89]);
    let err = client_for(&server)
        .upload(&image, FileCategory::Image)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Caption generation failed");
}
