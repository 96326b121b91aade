use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use ocmscope_k8s::{KubeClient, PodInfo};
use ocmscope_logs::{FetchEvent, FileLogSource, KubeLogSource, LogFetcher, LogRequest, RetryPolicy};
use ocmscope_table::{
    DetailsTable, FileStore, KeyValueStore, MemoryStore, ResourceRow, ResourceType, TopologyNode,
};
use ocmscope_tui::config::table_state_path;
use ocmscope_tui::{
    Action, AppState, DetailsTableScreen, Event, EventHandler, HelpOverlay, KeyBindings,
    KeyContext, LogViewState, LogViewerScreen, Screen, Settings, Tui,
};

/// Lines kept in memory for one log
const LOG_CAPACITY: usize = 100_000;

/// Namespace assumed for resources that do not name one
const DEFAULT_NAMESPACE: &str = "default";

/// ocmscope - A terminal console for Open Cluster Management resources and their logs
#[derive(Parser, Debug)]
#[command(name = "ocmscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file [default: <config dir>/ocmscope/config.toml]
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the resources of a topology node
    Details {
        /// Topology node JSON file, or - for stdin
        #[arg(value_name = "NODE_JSON")]
        node: PathBuf,

        /// Identifier the page size is saved under [default: the node type]
        #[arg(long)]
        table_id: Option<String>,
    },

    /// View the logs of a pod
    Logs {
        /// Pod name
        #[arg(value_name = "POD")]
        pod: String,

        #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,

        /// Container (defaults to the pod's first container)
        #[arg(short, long)]
        container: Option<String>,

        /// Kubeconfig context (defaults to the current context)
        #[arg(long)]
        context: Option<String>,

        /// Show the previous terminated instance
        #[arg(long)]
        previous: bool,

        /// Read an exported log file instead of the cluster
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref())?;

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// Diagnostics go to stderr (or a file) so they never land on the TUI
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Internal actions for async operations
enum InternalAction {
    LoadPod(LogRequest),
    PodLoaded(LogRequest, PodInfo),
    Fetch(LogRequest),
    StopFetch,
    Error(String),
}

/// Where log text comes from
enum Source {
    Kube(Arc<KubeLogSource>),
    File(Arc<FileLogSource>),
}

impl Source {
    fn start(
        &self,
        request: LogRequest,
        policy: RetryPolicy,
        tx: mpsc::UnboundedSender<FetchEvent>,
    ) -> LogFetcher {
        match self {
            Self::Kube(source) => LogFetcher::start(Arc::clone(source), request, policy, tx),
            Self::File(source) => LogFetcher::start(Arc::clone(source), request, policy, tx),
        }
    }
}

/// Everything the action handlers need besides the state
struct Deps<'a> {
    settings: &'a Settings,
    kube: Option<&'a Arc<KubeClient>>,
    internal_tx: &'a mpsc::UnboundedSender<InternalAction>,
}

async fn run_app(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;

    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchEvent>();

    let (mut state, kube, source) = match args.command {
        Command::Details { node, table_id } => {
            let node = read_node(&node)?;
            let table_id = table_id.unwrap_or_else(|| node.node_type.to_string());

            let mut state = AppState::new(Screen::DetailsTable);
            state.title = node.name.clone();
            state.table = Some(DetailsTable::new(
                table_id,
                &node,
                open_store(),
                settings.table.default_page_size,
            ));

            // Logs are optional here; the table works without a cluster
            let kube = match KubeClient::new() {
                Ok(kube) => Some(Arc::new(kube)),
                Err(e) => {
                    tracing::warn!(error = %format!("{:#}", e), "kubeconfig unavailable, pod logs disabled");
                    None
                }
            };
            let source = kube
                .as_ref()
                .map(|k| Source::Kube(Arc::new(KubeLogSource::new(Arc::clone(k)))));
            (state, kube, source)
        }

        Command::Logs {
            pod,
            namespace,
            container,
            context,
            previous,
            file,
        } => {
            let mut request = LogRequest::new(namespace, pod);
            request.container = container;
            request.context = context;
            request.previous = previous;
            request.tail_lines = settings.logs.tail_limit();

            let mut state = AppState::new(Screen::LogViewer);
            state.logs = Some(LogViewState::new(
                request.clone(),
                settings.logs.min_search_chars,
                LOG_CAPACITY,
            ));

            match file {
                Some(path) => {
                    let _ = internal_tx.send(InternalAction::Fetch(request));
                    (state, None, Some(Source::File(Arc::new(FileLogSource::new(path)))))
                }
                None => {
                    let kube = Arc::new(KubeClient::new()?);
                    if let Some(name) = &request.context {
                        if !kube.has_context(name) {
                            anyhow::bail!("Context '{}' not found in kubeconfig", name);
                        }
                    }
                    let source = Source::Kube(Arc::new(KubeLogSource::new(Arc::clone(&kube))));
                    let _ = internal_tx.send(InternalAction::LoadPod(request));
                    (state, Some(kube), Some(source))
                }
            }
        }
    };

    let mut fetcher: Option<LogFetcher> = None;

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new();
    let keybindings = KeyBindings::new();

    render(&mut tui, &mut state)?;

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.help_visible {
                            // Any of these close the overlay, everything else is ignored
                            match keybindings.get_action(KeyContext::Global, &key) {
                                Some(Action::ToggleHelp | Action::GoBack) => Some(Action::ToggleHelp),
                                Some(Action::Quit) => Some(Action::Quit),
                                _ => None,
                            }
                        } else if state.ui_state.search_active {
                            keybindings.get_search_input_action(&key)
                        } else {
                            let context = match state.current_screen {
                                Screen::DetailsTable => KeyContext::DetailsTable,
                                Screen::LogViewer => KeyContext::LogViewer,
                            };
                            keybindings.get_action(context, &key)
                        };

                        if state.has_message() {
                            state.dismiss_message();
                        }

                        if let Some(action) = action {
                            let ctx = Deps {
                                settings: &settings,
                                kube: kube.as_ref(),
                                internal_tx: &internal_tx,
                            };
                            handle_action(&mut state, &ctx, action);
                        }
                    }
                    Event::Resize(_, _) => {}
                    Event::Error(e) => {
                        state.show_error(e);
                    }
                }
            }

            Some(fetched) = fetch_rx.recv() => {
                handle_fetch_event(&mut state, fetched);
            }

            Some(internal) = internal_rx.recv() => {
                match internal {
                    InternalAction::LoadPod(request) => {
                        if let Some(kube) = &kube {
                            let kube = Arc::clone(kube);
                            let tx = internal_tx.clone();
                            tokio::spawn(async move {
                                let result = async {
                                    let client = kube.client_for_context(request.context.as_deref()).await?;
                                    kube.get_pod(&client, &request.namespace, &request.pod).await
                                }
                                .await;

                                let _ = match result {
                                    Ok(pod) => tx.send(InternalAction::PodLoaded(request, pod)),
                                    Err(e) => tx.send(InternalAction::Error(format!("{:#}", e))),
                                };
                            });
                        }
                    }

                    InternalAction::PodLoaded(request, pod) => {
                        if let Some(logs) = &mut state.logs {
                            if logs.request.pod == request.pod && logs.request.namespace == request.namespace {
                                let next = logs.set_containers(pod.container_names());
                                let _ = internal_tx.send(InternalAction::Fetch(next));
                            }
                        }
                    }

                    InternalAction::Fetch(request) => {
                        if let Some(source) = &source {
                            // Replacing the fetcher cancels the previous fetch
                            fetcher = Some(source.start(
                                request,
                                settings.logs.retry_policy(),
                                fetch_tx.clone(),
                            ));
                        }
                    }

                    InternalAction::StopFetch => {
                        fetcher = None;
                    }

                    InternalAction::Error(msg) => {
                        if let Some(logs) = &mut state.logs {
                            logs.fail();
                        }
                        state.show_error(msg);
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    // Cleanup
    drop(fetcher);
    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn handle_action(state: &mut AppState, ctx: &Deps, action: Action) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::GoBack => {
            if state.current_screen == Screen::LogViewer {
                let _ = ctx.internal_tx.send(InternalAction::StopFetch);
            }
            if !state.go_back() {
                state.should_quit = true;
            }
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }

        // Search bar
        Action::OpenSearch => state.start_search(),
        Action::CloseSearch => state.cancel_search(),
        Action::ApplySearch => state.apply_search(),
        Action::SearchInput(c) => state.search_input_char(c),
        Action::SearchBackspace => state.search_input_backspace(),
        Action::SearchClear => state.set_search_input(String::new()),

        // Details table
        Action::RowUp => state.row_up(),
        Action::RowDown => state.row_down(),
        Action::OpenRow => open_selected_row(state, ctx),
        Action::NextPage => {
            if let Some(table) = &mut state.table {
                table.next_page();
            }
            state.reset_selection();
        }
        Action::PrevPage => {
            if let Some(table) = &mut state.table {
                table.prev_page();
            }
            state.reset_selection();
        }
        Action::CyclePageSize => {
            if let Some(table) = &mut state.table {
                if let Err(e) = table.cycle_per_page() {
                    tracing::warn!(table = table.id(), error = %e, "could not save page size");
                    state.show_error(format!("Could not save page size: {}", e));
                }
            }
            state.reset_selection();
        }
        Action::SortBy(column) => {
            if let Some(table) = &mut state.table {
                table.toggle_sort(column);
            }
        }
        Action::ClearSort => {
            if let Some(table) = &mut state.table {
                table.clear_sort();
            }
        }

        // Log viewer
        Action::ScrollUp(n) => with_logs(state, |logs| logs.scroll_up(n)),
        Action::ScrollDown(n) => with_logs(state, |logs| logs.scroll_down(n)),
        Action::PageUp => with_logs(state, LogViewState::page_up),
        Action::PageDown => with_logs(state, LogViewState::page_down),
        Action::ScrollToTop => with_logs(state, LogViewState::scroll_to_top),
        Action::ScrollToBottom => with_logs(state, LogViewState::scroll_to_bottom),
        Action::NextMatch => with_logs(state, LogViewState::next_match),
        Action::PrevMatch => with_logs(state, LogViewState::prev_match),
        Action::ToggleWrap => with_logs(state, |logs| logs.wrap_lines = !logs.wrap_lines),
        Action::NextContainer | Action::PrevContainer => {
            let forward = action == Action::NextContainer;
            if let Some(request) = state.logs.as_mut().and_then(|l| l.cycle_container(forward)) {
                let _ = ctx.internal_tx.send(InternalAction::Fetch(request));
            }
        }
        Action::TogglePrevious => {
            if let Some(logs) = &mut state.logs {
                let request = logs.toggle_previous();
                let _ = ctx.internal_tx.send(InternalAction::Fetch(request));
            }
        }
        Action::ReloadLogs => {
            if let Some(logs) = &mut state.logs {
                let request = logs.begin_reload();
                let _ = ctx.internal_tx.send(InternalAction::Fetch(request));
            }
        }
        Action::ExportLogs => {
            if let Some(logs) = &state.logs {
                let file_name = logs.export_file_name();
                match export_logs(Path::new(&file_name), logs) {
                    Ok(count) => state.show_info(format!("Exported {} lines to {}", count, file_name)),
                    Err(e) => state.show_error(format!("Export failed: {:#}", e)),
                }
            }
        }

        Action::ShowError(msg) => state.show_error(msg),
        Action::DismissMessage => state.dismiss_message(),
        Action::Render => {}
    }
}

fn with_logs(state: &mut AppState, f: impl FnOnce(&mut LogViewState)) {
    if let Some(logs) = &mut state.logs {
        f(logs);
    }
}

/// Open the log viewer for the selected row, if it is a pod
fn open_selected_row(state: &mut AppState, ctx: &Deps) {
    let Some(table) = &state.table else {
        return;
    };
    if *table.detail_type() != ResourceType::Pod {
        let msg = format!("Logs are only available for pods, not {}", table.detail_type());
        state.show_info(msg);
        return;
    }
    let Some(row) = state.selected_row().cloned() else {
        return;
    };
    let Some(kube) = ctx.kube else {
        state.show_error("Kubeconfig unavailable; cannot open pod logs".to_string());
        return;
    };

    let request = row_log_request(
        &row,
        kube.context_for_cluster(&row.cluster),
        ctx.settings.logs.tail_limit(),
    );
    state.open_logs(LogViewState::new(
        request.clone(),
        ctx.settings.logs.min_search_chars,
        LOG_CAPACITY,
    ));
    let _ = ctx.internal_tx.send(InternalAction::LoadPod(request));
}

/// Log request for the pod shown in a table row
fn row_log_request(row: &ResourceRow, context: Option<String>, tail_lines: Option<i64>) -> LogRequest {
    let mut request = LogRequest::new(
        row.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE),
        row.name.clone(),
    );
    request.context = context;
    request.tail_lines = tail_lines;
    request
}

fn handle_fetch_event(state: &mut AppState, event: FetchEvent) {
    let Some(logs) = &mut state.logs else {
        return;
    };

    match event {
        FetchEvent::Loaded { request, text } if request == logs.request => {
            tracing::debug!(log = %request.label(), bytes = text.len(), "logs loaded");
            logs.load(&text);
        }
        FetchEvent::Failed { request, error } if request == logs.request => {
            logs.fail();
            state.show_error(error);
        }
        FetchEvent::Loaded { request, .. } | FetchEvent::Failed { request, .. } => {
            tracing::debug!(log = %request.label(), "dropping result of a stale fetch");
        }
    }
}

/// Read a topology node from a file, or from stdin for `-`
fn read_node(path: &Path) -> Result<TopologyNode> {
    let json = if path == Path::new("-") {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read node from stdin")?;
        json
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read node file {}", path.display()))?
    };

    TopologyNode::from_json(&json).context("Invalid topology node")
}

/// Page-size storage: the state file when a config dir exists, memory otherwise
fn open_store() -> Box<dyn KeyValueStore> {
    match table_state_path() {
        Some(path) => Box::new(FileStore::open(path)),
        None => {
            tracing::warn!("no config directory, page sizes will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

fn export_logs(path: &Path, logs: &LogViewState) -> Result<usize> {
    let text = logs.buffer.export_raw();
    std::fs::write(path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(logs.buffer.len())
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.draw(|frame| {
        match state.current_screen {
            Screen::DetailsTable => DetailsTableScreen::render(frame, state),
            Screen::LogViewer => LogViewerScreen::render(frame, state),
        }

        if state.ui_state.help_visible {
            HelpOverlay::render(frame, state.current_screen);
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocmscope_table::Pulse;

    #[test]
    fn test_parse_details_command() {
        let args = Args::try_parse_from(["ocmscope", "details", "node.json", "--table-id", "pods"]).unwrap();
        match args.command {
            Command::Details { node, table_id } => {
                assert_eq!(node, PathBuf::from("node.json"));
                assert_eq!(table_id.as_deref(), Some("pods"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_logs_command() {
        let args = Args::try_parse_from([
            "ocmscope",
            "--log-file",
            "/tmp/ocmscope.log",
            "logs",
            "web-abc",
            "-n",
            "shop",
            "-c",
            "app",
            "--context",
            "east",
            "--previous",
        ])
        .unwrap();

        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/ocmscope.log")));
        match args.command {
            Command::Logs {
                pod,
                namespace,
                container,
                context,
                previous,
                file,
            } => {
                assert_eq!(pod, "web-abc");
                assert_eq!(namespace, "shop");
                assert_eq!(container.as_deref(), Some("app"));
                assert_eq!(context.as_deref(), Some("east"));
                assert!(previous);
                assert!(file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_logs_namespace_defaults() {
        let args = Args::try_parse_from(["ocmscope", "logs", "web", "--config", "c.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(args.command, Command::Logs { ref namespace, .. } if namespace == "default"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["ocmscope"]).is_err());
    }

    #[test]
    fn test_row_log_request() {
        let row = ResourceRow {
            pulse: Pulse::Green,
            name: "web-abc".to_string(),
            namespace: None,
            cluster: "east".to_string(),
            resource_type: ResourceType::Pod,
        };

        let request = row_log_request(&row, Some("east".to_string()), Some(1000));
        assert_eq!(request.namespace, "default");
        assert_eq!(request.pod, "web-abc");
        assert_eq!(request.context.as_deref(), Some("east"));
        assert_eq!(request.tail_lines, Some(1000));
        assert!(!request.previous);
    }

    #[test]
    fn test_read_node_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        std::fs::write(&path, r#"{"name":"web","type":"deployment"}"#).unwrap();

        let node = read_node(&path).unwrap();
        assert_eq!(node.node_type, ResourceType::Deployment);

        assert!(read_node(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let mut request = LogRequest::new("shop", "web");
        request.container = Some("app".to_string());

        let mut state = AppState::new(Screen::LogViewer);
        state.logs = Some(LogViewState::new(request.clone(), 1, 100));

        let mut stale = request.clone();
        stale.container = Some("sidecar".to_string());
        handle_fetch_event(
            &mut state,
            FetchEvent::Loaded {
                request: stale,
                text: "old".to_string(),
            },
        );
        assert!(state.logs.as_ref().unwrap().buffer.is_empty());

        handle_fetch_event(
            &mut state,
            FetchEvent::Loaded {
                request,
                text: "fresh\nlines".to_string(),
            },
        );
        let logs = state.logs.as_ref().unwrap();
        assert_eq!(logs.buffer.len(), 2);
        assert!(!logs.loading);
    }
}
