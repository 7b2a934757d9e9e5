use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use rag_console::analysis::{ChartTab, ChartView, LinkBoard, LinkFilter, LinkSort};
use rag_console::api::{ApiClient, QueryMode, QueryRequest};
use rag_console::chat::{Message, SubmitOutcome};
use rag_console::core::config::{
    derive_ws_url, AppPaths, ClientConfig, ConfigService, QueryOptions,
};
use rag_console::core::logging;
use rag_console::upload::{UploadFile, UploadPanel};
use rag_console::workspace::{render_message, render_upload, Tab, Workspace};
use rag_console::ws::{ChatChannel, SttStream};

const DEFAULT_AUDIO_CHUNK: usize = 16 * 1024;

#[derive(Parser)]
#[command(name = "rag-console")]
#[command(version)]
#[command(about = "Terminal client for the multi-modal RAG backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL (overrides config and RAG_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// WebSocket base URL; derived from --api-url when omitted
    #[arg(long, global = true)]
    ws_url: Option<String>,

    /// Config file (default: <data dir>/config.yml)
    #[arg(long, global = true, env = "RAG_CONSOLE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Check backend health
    Health,

    /// Ask a single question
    Ask {
        question: Vec<String>,
        /// Use the multi-modal query endpoint
        #[arg(long, short)]
        multimodal: bool,
        #[arg(long, short = 'n')]
        num_results: Option<u32>,
        #[arg(long)]
        no_web_search: bool,
        #[arg(long)]
        drive_search: bool,
        /// Send over the /ws/chat channel instead of HTTP (plain mode only)
        #[arg(long, conflicts_with = "multimodal")]
        ws: bool,
    },

    /// Interactive workspace (/mode, /tab, /upload, /links, /quit)
    Chat {
        #[arg(long, short)]
        multimodal: bool,
    },

    /// Classify and upload files one at a time
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Manage indexed documents
    Documents {
        #[command(subcommand)]
        action: DocumentsAction,
    },

    /// Raw retrieval without answer generation
    Search {
        query: Vec<String>,
        #[arg(long, short = 'n')]
        num_results: Option<u32>,
    },

    /// Look up one citation
    Citation { id: String },

    /// Analyze a chart image and show the result
    Chart {
        file: PathBuf,
        /// overview, data, insights, facts or all
        #[arg(long, default_value = "all")]
        tab: String,
    },

    /// Visual-text links stored for a document
    Links {
        document_id: String,
        /// Relationship name or "all"
        #[arg(long, default_value = "all")]
        filter: LinkFilter,
        /// confidence or relationship
        #[arg(long, default_value = "confidence")]
        sort: LinkSort,
    },

    /// Charts analyzed so far by the backend
    Charts,

    /// Stream an audio file to speech-to-text
    Listen {
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_AUDIO_CHUNK)]
        chunk_size: usize,
    },
}

#[derive(Subcommand)]
enum DocumentsAction {
    List,
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let service = ConfigService::new(Arc::new(AppPaths::new()));
    logging::init(service.paths(), &cli.log_level);

    let config = load_config(&cli, &service)?;
    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;
    tracing::debug!(api = %config.api_base_url, "Client ready");

    run(cli, config, client).await
}

fn load_config(cli: &Cli, service: &ConfigService) -> anyhow::Result<ClientConfig> {
    let loaded = match &cli.config {
        Some(path) => service
            .load_from(path, |key| std::env::var(key).ok())
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => service.load_config().with_context(|| {
            format!("Failed to load config from {}", service.config_path().display())
        }),
    };
    let mut config = loaded?;

    if let Some(api_url) = &cli.api_url {
        config.api_base_url = api_url.clone();
        if cli.ws_url.is_none() {
            config.ws_base_url = derive_ws_url(api_url);
        }
    }
    if let Some(ws_url) = &cli.ws_url {
        config.ws_base_url = ws_url.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Applies a per-command `--num-results` and re-checks the query bounds.
fn query_options(base: &QueryOptions, num_results: Option<u32>) -> anyhow::Result<QueryOptions> {
    let mut options = base.clone();
    if let Some(n) = num_results {
        options.num_results = n;
    }
    ClientConfig {
        query: options.clone(),
        ..ClientConfig::default()
    }
    .validate()
    .context("Invalid --num-results")?;
    Ok(options)
}

async fn run(cli: Cli, config: ClientConfig, client: ApiClient) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Health => {
            let health = client.health().await.context("Health check failed")?;
            if json {
                return print_json(&health);
            }
            println!("status: {}", health.status);
            if let Some(version) = &health.version {
                println!("version: {}", version);
            }
            for (name, state) in &health.services {
                println!("  {:<16} {}", name, if state.is_up() { "up" } else { "down" });
            }
            if !health.is_healthy() {
                anyhow::bail!("backend reports status '{}'", health.status);
            }
        }
        Command::Ask {
            question,
            multimodal,
            num_results,
            no_web_search,
            drive_search,
            ws,
        } => {
            let question = question.join(" ");
            if question.trim().is_empty() {
                anyhow::bail!("question is empty");
            }
            let mut options = query_options(client.query_defaults(), num_results)?;
            options.include_web_search &= !no_web_search;
            options.include_drive_search |= drive_search;
            let request = QueryRequest::new(question.trim(), &options);
            // The chat channel always answers in plain mode.
            let mode = if ws {
                QueryMode::Plain
            } else {
                QueryMode::from_flag(multimodal || config.multimodal)
            };

            let response = if ws {
                let mut channel = ChatChannel::connect(&config.ws_base_url)
                    .await
                    .context("Failed to open chat channel")?;
                let session_id = uuid::Uuid::new_v4().to_string();
                let response = channel.ask(&session_id, &request).await?;
                channel.close().await?;
                response
            } else {
                client
                    .query_with(&request, mode)
                    .await
                    .context("Query failed")?
            };

            if json {
                return print_json(&response);
            }
            let message = Message::from_response(response, mode.is_multimodal());
            print!("{}", render_message(&message));
        }
        Command::Chat { multimodal } => {
            let mode = QueryMode::from_flag(multimodal || config.multimodal);
            let workspace = Workspace::new(client, config.query.clone(), mode);
            repl(workspace).await?;
        }
        Command::Upload { files } => {
            let batch = read_files(&files).await?;
            let mut panel = UploadPanel::new();
            let results = panel.process_batch(batch, &client).await;
            if json {
                return print_json(&results);
            }
            for result in results {
                print!("{}", render_upload(result));
            }
            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                anyhow::bail!("{} of {} uploads failed", failed, results.len());
            }
        }
        Command::Documents { action } => match action {
            DocumentsAction::List => {
                let documents = client.list_documents().await.context("Listing failed")?;
                if json {
                    return print_json(&documents);
                }
                if documents.is_empty() {
                    println!("No documents indexed.");
                }
                for doc in &documents {
                    match &doc.filename {
                        Some(name) => println!("{}  {}", doc.id, name),
                        None => println!("{}", doc.id),
                    }
                }
            }
            DocumentsAction::Delete { id } => {
                let response = client
                    .delete_document(&id)
                    .await
                    .with_context(|| format!("Failed to delete {}", id))?;
                if json {
                    return print_json(&response);
                }
                println!(
                    "{}",
                    response
                        .message
                        .unwrap_or_else(|| format!("Deleted {}", id))
                );
            }
        },
        Command::Search { query, num_results } => {
            let options = query_options(client.query_defaults(), num_results)?;
            let request = QueryRequest::new(query.join(" "), &options);
            let results = client.search(&request).await.context("Search failed")?;
            print_json(&results)?;
        }
        Command::Citation { id } => {
            let citation = client.citation(&id).await.context("Citation lookup failed")?;
            print_json(&citation)?;
        }
        Command::Chart { file, tab } => {
            let upload = UploadFile::from_path(&file).await?;
            let analysis = client
                .analyze_chart(&upload)
                .await
                .context("Chart analysis failed")?;
            if json {
                return print_json(&analysis);
            }
            let view = ChartView::new(&analysis);
            if tab.eq_ignore_ascii_case("all") {
                print!("{}", view.render_all());
            } else {
                let tab: ChartTab = tab.parse().map_err(anyhow::Error::msg)?;
                print!("{}", view.render(tab));
            }
        }
        Command::Links {
            document_id,
            filter,
            sort,
        } => {
            let response = client
                .visual_links(&document_id)
                .await
                .context("Failed to fetch visual links")?;
            if json {
                return print_json(&response);
            }
            let board = LinkBoard::new(response.visual_text_links);
            print!("{}", board.render(&filter, sort));
        }
        Command::Charts => {
            let charts = client.list_charts().await.context("Failed to list charts")?;
            if json {
                return print_json(&charts);
            }
            if charts.charts.is_empty() {
                println!("No charts analyzed yet.");
            }
            for chart in &charts.charts {
                println!(
                    "{}  {} ({:.0}%), {} facts  {}",
                    chart.id,
                    chart.chart_type,
                    chart.confidence * 100.0,
                    chart.facts_count,
                    chart.description_preview
                );
            }
        }
        Command::Listen { file, chunk_size } => {
            listen(&config.ws_base_url, &file, chunk_size.max(1), json).await?;
        }
    }
    Ok(())
}

async fn repl(mut workspace: Workspace<ApiClient>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!(
        "Mode: {}. Commands: /mode [plain|multimodal], /tab <chat|upload|charts|links>, /upload <files>, /links <document id>, /quit",
        workspace.chat().mode()
    );
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "/quit" | "/exit" => break,
            "/mode" => {
                let mode = if rest.is_empty() {
                    workspace.chat().toggle_mode()
                } else {
                    match rest.parse::<QueryMode>() {
                        Ok(mode) => {
                            workspace.chat().set_mode(mode);
                            mode
                        }
                        Err(err) => {
                            eprintln!("{}", err);
                            continue;
                        }
                    }
                };
                println!("Mode: {}", mode);
            }
            "/tab" => match rest.parse::<Tab>() {
                Ok(tab) => {
                    workspace.switch_to(tab);
                    print!("{}", workspace.render_active());
                }
                Err(err) => eprintln!("{}", err),
            },
            "/upload" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    eprintln!("usage: /upload <file> [file...]");
                    continue;
                }
                let files = match read_files(&paths).await {
                    Ok(files) => files,
                    Err(err) => {
                        eprintln!("{:#}", err);
                        continue;
                    }
                };
                for result in workspace.upload(files).await {
                    print!("{}", render_upload(&result));
                }
            }
            "/links" => {
                if rest.is_empty() {
                    workspace.switch_to(Tab::Links);
                    print!("{}", workspace.render_active());
                    continue;
                }
                match workspace.chat().backend().visual_links(rest).await {
                    Ok(response) => {
                        workspace.set_links(response.visual_text_links);
                        workspace.switch_to(Tab::Links);
                        print!("{}", workspace.render_active());
                    }
                    Err(err) => eprintln!("{}", err),
                }
            }
            "" => continue,
            other if other.starts_with('/') => eprintln!("Unknown command {}", other),
            _ => match workspace.ask(line).await {
                SubmitOutcome::Answered(reply) | SubmitOutcome::Failed(reply) => {
                    print!("{}", render_message(&reply));
                }
                SubmitOutcome::Busy => eprintln!("Still waiting for the previous answer."),
                SubmitOutcome::Empty => {}
            },
        }
    }
    Ok(())
}

async fn listen(ws_base_url: &str, file: &Path, chunk_size: usize, json: bool) -> anyhow::Result<()> {
    let audio = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let mut stream = SttStream::connect(ws_base_url)
        .await
        .context("Failed to open speech-to-text stream")?;

    for chunk in audio.chunks(chunk_size) {
        stream.send_audio(chunk.to_vec()).await?;
        let Some(transcript) = stream.next_transcript().await? else {
            break;
        };
        if json {
            print_json(&transcript)?;
        } else if transcript.is_partial {
            println!("… {}", transcript.text);
        } else {
            println!("{} ({:.0}%)", transcript.text, transcript.confidence * 100.0);
        }
    }
    stream.close().await?;
    Ok(())
}

async fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
