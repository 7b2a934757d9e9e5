use async_trait::async_trait;
use rag_console::api::{
    ChartAnalysis, DocumentUploadResponse, QueryMode, QueryRequest, QueryResponse, UploadResponse,
    VisualTextLink,
};
use rag_console::chat::{QueryBackend, SubmitOutcome};
use rag_console::core::config::QueryOptions;
use rag_console::core::errors::ClientError;
use rag_console::upload::{FileCategory, UploadFile, UploadHandler};
use rag_console::workspace::{Tab, Workspace};
use serde_json::json;

/// Answers every question with a chart attachment and uploads everything
/// except files named `broken*`.
struct FakeBackend;

fn chart(chart_type: &str) -> ChartAnalysis {
    serde_json::from_value(json!({
        "chart_type": chart_type,
        "text_description": "Sales by region",
        "data_insights": {"data_points": [{"category": "EU", "value": 12}]},
        "queryable_facts": ["EU sold 12"],
        "confidence": 0.8
    }))
    .unwrap()
}

#[async_trait]
impl QueryBackend for FakeBackend {
    async fn send_query(
        &self,
        _request: &QueryRequest,
        mode: QueryMode,
    ) -> Result<QueryResponse, ClientError> {
        let metadata = if mode.is_multimodal() {
            json!({
                "chart_analysis": serde_json::to_value(chart("line")).unwrap(),
                "visual_links": [
                    {"visual_id": "img-1", "relationship": "explains", "confidence": 0.9},
                    {"visual_id": "img-2", "relationship": "supports", "confidence": 0.4}
                ]
            })
        } else {
            json!({})
        };
        Ok(serde_json::from_value(json!({
            "answer": "ok",
            "citations": [],
            "confidence_score": 0.5,
            "processing_time_ms": 1,
            "metadata": metadata
        }))
        .unwrap())
    }
}

#[async_trait]
impl UploadHandler for FakeBackend {
    async fn upload(
        &self,
        file: &UploadFile,
        category: FileCategory,
    ) -> Result<UploadResponse, ClientError> {
        if file.name.starts_with("broken") {
            return Err(ClientError::Upload("corrupt file".to_string()));
        }
        Ok(match category {
            FileCategory::Chart => UploadResponse::Chart(chart("bar")),
            _ => UploadResponse::Document(DocumentUploadResponse {
                success: true,
                ..Default::default()
            }),
        })
    }
}

fn workspace(mode: QueryMode) -> Workspace<FakeBackend> {
    Workspace::new(FakeBackend, QueryOptions::default(), mode)
}

#[tokio::test]
async fn chart_uploads_appear_in_charts_tab() {
    let mut ws = workspace(QueryMode::Plain);

    let results = ws
        .upload(vec![
            UploadFile::new("q1_chart.png", "image/png", vec![1]),
            UploadFile::new("broken_chart.png", "image/png", vec![2]),
            UploadFile::new("report.pdf", "application/pdf", vec![3]),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(ws.charts().len(), 1);
    assert_eq!(ws.charts()[0].chart_type, "bar");

    ws.switch_to(Tab::Charts);
    let rendered = ws.render_active();
    assert!(rendered.contains("#1 Bar chart (80% confidence)"));

    let uploads = ws.render(Tab::Upload);
    assert!(uploads.contains("error broken_chart.png (chart): corrupt file"));
    assert!(uploads.contains("ok    q1_chart.png (chart)"));
}

#[tokio::test]
async fn multimodal_answers_feed_charts_and_links() {
    let mut ws = workspace(QueryMode::MultiModal);

    let outcome = ws.ask("what does the chart show?").await;

    assert!(matches!(outcome, SubmitOutcome::Answered(_)));
    assert_eq!(ws.charts().len(), 1);
    assert_eq!(ws.links().len(), 2);

    let links = ws.render(Tab::Links);
    let first = links.lines().next().unwrap();
    assert!(first.starts_with("img-1"));

    let chat = ws.render(Tab::Chat);
    assert!(chat.contains("you> what does the chart show?"));
    assert!(chat.contains("multimodal: line chart, 2 visual links"));
}

#[tokio::test]
async fn plain_answers_leave_other_widgets_untouched() {
    let mut ws = workspace(QueryMode::Plain);

    ws.ask("hello").await;

    assert!(ws.charts().is_empty());
    assert!(ws.links().is_empty());
    assert_eq!(ws.render(Tab::Charts), "No charts analyzed yet.\n");
}

#[tokio::test]
async fn set_links_replaces_the_board() {
    let mut ws = workspace(QueryMode::MultiModal);
    ws.ask("first").await;

    ws.set_links(vec![VisualTextLink::new("fig-3", "illustrates", 0.7, vec![])]);

    assert_eq!(ws.links().len(), 1);
    assert_eq!(ws.links().relationships(), vec!["illustrates"]);
    assert_eq!(ws.active_tab(), Tab::Chat);
}
