//! The page container: one chat, one upload panel, and the chart and link
//! views fed by both.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::analysis::format::format_percent;
use crate::analysis::{ChartTab, ChartView, LinkBoard, LinkFilter, LinkSort};
use crate::api::{ChartAnalysis, QueryMode, VisualTextLink};
use crate::chat::{ChatSession, Message, QueryBackend, SubmitOutcome};
use crate::core::config::QueryOptions;
use crate::upload::{UploadFile, UploadHandler, UploadPanel, UploadResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Chat,
    Upload,
    Charts,
    Links,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Chat, Tab::Upload, Tab::Charts, Tab::Links];
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tab::Chat => "chat",
            Tab::Upload => "upload",
            Tab::Charts => "charts",
            Tab::Links => "links",
        };
        f.write_str(name)
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Tab::Chat),
            "upload" | "uploads" => Ok(Tab::Upload),
            "chart" | "charts" => Ok(Tab::Charts),
            "link" | "links" => Ok(Tab::Links),
            other => Err(format!(
                "unknown tab '{}' (expected chat, upload, charts or links)",
                other
            )),
        }
    }
}

/// Owns every widget. Widgets do not talk to each other directly; results
/// are threaded through here.
pub struct Workspace<C> {
    chat: ChatSession<C>,
    uploads: UploadPanel,
    charts: Vec<ChartAnalysis>,
    links: LinkBoard,
    active: Tab,
    chart_tab: ChartTab,
    link_filter: LinkFilter,
    link_sort: LinkSort,
}

impl<C> Workspace<C>
where
    C: QueryBackend + UploadHandler,
{
    pub fn new(client: C, options: QueryOptions, mode: QueryMode) -> Self {
        Self {
            chat: ChatSession::new(client, options, mode),
            uploads: UploadPanel::new(),
            charts: Vec::new(),
            links: LinkBoard::default(),
            active: Tab::default(),
            chart_tab: ChartTab::default(),
            link_filter: LinkFilter::default(),
            link_sort: LinkSort::default(),
        }
    }

    pub fn chat(&self) -> &ChatSession<C> {
        &self.chat
    }

    pub fn uploads(&self) -> &UploadPanel {
        &self.uploads
    }

    pub fn charts(&self) -> &[ChartAnalysis] {
        &self.charts
    }

    pub fn links(&self) -> &LinkBoard {
        &self.links
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn switch_to(&mut self, tab: Tab) {
        tracing::debug!(%tab, "Switching tab");
        self.active = tab;
    }

    pub fn set_chart_tab(&mut self, tab: ChartTab) {
        self.chart_tab = tab;
    }

    pub fn set_link_view(&mut self, filter: LinkFilter, sort: LinkSort) {
        self.link_filter = filter;
        self.link_sort = sort;
    }

    /// Replaces the link board contents, e.g. with a document's stored links.
    pub fn set_links(&mut self, links: Vec<VisualTextLink>) {
        self.links.replace(links);
    }

    /// Submits a question and threads any multi-modal attachment of the
    /// reply into the charts list and link board.
    pub async fn ask(&mut self, text: &str) -> SubmitOutcome {
        let outcome = self.chat.submit(text).await;
        if let SubmitOutcome::Answered(reply) = &outcome {
            self.absorb_attachment(reply);
        }
        outcome
    }

    fn absorb_attachment(&mut self, reply: &Message) {
        let Some(attachment) = &reply.attachment else {
            return;
        };
        if let Some(analysis) = &attachment.chart_analysis {
            self.charts.push(analysis.clone());
        }
        if !attachment.visual_links.is_empty() {
            self.links.extend(attachment.visual_links.iter().cloned());
        }
    }

    /// Uploads a batch and returns its results; successful chart analyses
    /// join the charts list.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Vec<UploadResult> {
        let batch = self
            .uploads
            .process_batch(files, self.chat.backend())
            .await
            .to_vec();
        self.charts
            .extend(batch.iter().filter_map(|r| r.chart_analysis().cloned()));
        batch
    }

    pub fn render_active(&self) -> String {
        self.render(self.active)
    }

    pub fn render(&self, tab: Tab) -> String {
        match tab {
            Tab::Chat => self.render_chat(),
            Tab::Upload => self.render_uploads(),
            Tab::Charts => self.render_charts(),
            Tab::Links => self.links.render(&self.link_filter, self.link_sort),
        }
    }

    fn render_chat(&self) -> String {
        let messages = self.chat.messages();
        if messages.is_empty() {
            return format!("No messages yet. Mode: {}\n", self.chat.mode());
        }
        let mut out = String::new();
        for message in &messages {
            out.push_str(&render_message(message));
        }
        if self.chat.is_busy() {
            out.push_str("…thinking\n");
        }
        out
    }

    fn render_uploads(&self) -> String {
        let mut out = String::new();
        if self.uploads.is_uploading() {
            out.push_str("Uploading…\n");
        }
        if self.uploads.results().is_empty() {
            out.push_str("No uploads yet.\n");
        }
        for result in self.uploads.results() {
            out.push_str(&render_upload(result));
        }
        out
    }

    fn render_charts(&self) -> String {
        if self.charts.is_empty() {
            return "No charts analyzed yet.\n".to_string();
        }
        let mut out = String::new();
        for (index, analysis) in self.charts.iter().enumerate() {
            let view = ChartView::new(analysis);
            let _ = writeln!(out, "#{} {}", index + 1, view.headline());
            out.push_str(&view.render(self.chart_tab));
            out.push('\n');
        }
        out
    }
}

pub fn render_message(message: &Message) -> String {
    let mut out = String::new();
    let speaker = if message.is_user() { "you" } else { "assistant" };
    let _ = writeln!(out, "{}> {}", speaker, message.content);

    if let Some(confidence) = message.confidence {
        let _ = writeln!(
            out,
            "   confidence {}, {} citations",
            format_percent(confidence),
            message.citations.len()
        );
    }
    for citation in &message.citations {
        let _ = writeln!(out, "   [{}]", citation.label());
    }
    if let Some(attachment) = &message.attachment {
        let mut extras = Vec::new();
        if let Some(chart) = &attachment.chart_analysis {
            extras.push(format!("{} chart", chart.chart_type));
        }
        if !attachment.visual_links.is_empty() {
            extras.push(format!("{} visual links", attachment.visual_links.len()));
        }
        if !extras.is_empty() {
            let _ = writeln!(out, "   multimodal: {}", extras.join(", "));
        }
    }
    out
}

pub fn render_upload(result: &UploadResult) -> String {
    match result.response() {
        Some(response) => format!(
            "ok    {} ({}): {}\n",
            result.filename,
            result.category,
            response.summary()
        ),
        None => format!(
            "error {} ({}): {}\n",
            result.filename,
            result.category,
            result.error_message().unwrap_or_default()
        ),
    }
}
