//! Marknote entrypoint.
use anyhow::Result;
use clap::Parser;
use core_actions::{Action, KeyContext, Shell, ShellSettings, translate_key};
use core_config::load_from;
use core_events::{EVENT_CHANNEL_CAP, Event, EventSources, InputEvent, IoWorker, NoticeTicker};
use core_io::{DocumentIo, FsDocumentIo, LocationHandle};
use core_render::MarkdownRenderer;
use core_render::layout::ScreenLayout;
use core_state::ContentStore;
use core_terminal::{APP_TITLE, CrosstermBackend, TerminalBackend, TerminalGuard};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod paint;

const LOG_FILE_NAME: &str = "marknote.log";
const TICK_INTERVAL: Duration = Duration::from_millis(250);
const JOIN_TIMEOUT: Duration = Duration::from_millis(200);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "marknote", version, about = "Marknote Markdown editor")]
struct Args {
    /// Markdown document to open at startup. Without it the sample document is shown.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `marknote.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    backend: CrosstermBackend,
    _log_guard: Option<WorkerGuard>,
}

struct RuntimeContext<'a> {
    shell: Shell,
    io: Arc<dyn DocumentIo>,
    incoming: Option<LocationHandle>,
    terminal_guard: TerminalGuard<'a, CrosstermBackend>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            _log_guard: None,
        }
    }

    fn run(&mut self) -> Result<RuntimeContext<'_>> {
        self._log_guard = init_logging();
        Self::install_panic_hook();

        info!(target: "runtime", "startup");
        let args = Args::parse();
        let config_override = args.config.is_some();
        let config = load_from(args.config)?;

        let io: Arc<dyn DocumentIo> = Arc::new(FsDocumentIo::new(config.base_dir()));
        let shell = Shell::new(
            ContentStore::new(),
            Rc::new(MarkdownRenderer::new()),
            ShellSettings::from_config(&config),
        );
        let incoming = args.path.as_deref().map(incoming_handle);

        info!(
            target: "runtime.startup",
            config_override,
            config_found = config.source.is_some(),
            incoming = incoming.is_some(),
            "bootstrap_complete"
        );

        self.backend.set_title(APP_TITLE)?;
        let terminal_guard = self.backend.enter_guard()?;
        Ok(RuntimeContext {
            shell,
            io,
            incoming,
            terminal_guard,
        })
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Route `tracing` output to `marknote.log` in the working directory, truncated
/// on every start. Filtering follows `RUST_LOG`.
fn init_logging() -> Option<WorkerGuard> {
    let dir = Path::new(".");
    let _ = std::fs::remove_file(dir.join(LOG_FILE_NAME));
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .ok()
        .map(|()| guard)
}

/// Command line paths are relative to the working directory, not the
/// configured base directory.
fn incoming_handle(path: &Path) -> LocationHandle {
    match std::path::absolute(path) {
        Ok(abs) => LocationHandle::from(abs),
        Err(_) => LocationHandle::from(path),
    }
}

enum LoopControl {
    Continue { redraw: bool },
    Break { reason: ShutdownReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    ActionQuit,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::ActionQuit => "action_quit",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

/// Wait for a background task, logging how it ended.
async fn join_task(task: &'static str, handle: JoinHandle<()>, reason: ShutdownReason) {
    let reason = reason.as_str();
    match tokio::time::timeout(JOIN_TIMEOUT, handle).await {
        Ok(Ok(())) => trace!(target: "runtime.shutdown", task, reason, "task_joined"),
        Ok(Err(err)) if err.is_cancelled() => {
            trace!(target: "runtime.shutdown", task, reason, "task_cancelled")
        }
        Ok(Err(err)) => error!(target: "runtime.shutdown", task, reason, ?err, "task_failed"),
        Err(_) => warn!(target: "runtime.shutdown", task, reason, "task_join_timeout"),
    }
}

struct EditorRuntime<'a> {
    shell: Shell,
    io: IoWorker,
    incoming: Option<LocationHandle>,
    size: (u16, u16),
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<JoinHandle<()>>,
    input_task: Option<JoinHandle<()>>,
    input_shutdown: Option<core_input::InputShutdown>,
    _terminal_guard: TerminalGuard<'a, CrosstermBackend>,
}

impl<'a> EditorRuntime<'a> {
    fn new(
        context: RuntimeContext<'a>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        input_task: JoinHandle<()>,
        input_shutdown: core_input::InputShutdown,
        source_handles: Vec<JoinHandle<()>>,
    ) -> Self {
        let RuntimeContext {
            shell,
            io,
            incoming,
            mut terminal_guard,
        } = context;
        let size = terminal_guard.backend().size().unwrap_or((80, 24));
        Self {
            shell,
            io: IoWorker::new(io, tx.clone()),
            incoming,
            size,
            rx,
            tx: Some(tx),
            source_handles,
            input_task: Some(input_task),
            input_shutdown: Some(input_shutdown),
            _terminal_guard: terminal_guard,
        }
    }

    async fn run(&mut self) -> Result<()> {
        self.apply_size(self.size.0, self.size.1);
        if let Some(handle) = self.incoming.take() {
            let request = self.shell.open_incoming(handle);
            let _ = self.io.submit(request);
        }
        self.redraw();

        let loop_span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = loop_span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            let control = match event {
                Event::Input(input) => self.handle_input_event(input),
                Event::Io(completion) => {
                    self.shell.complete_io(completion);
                    LoopControl::Continue { redraw: true }
                }
                Event::Tick => LoopControl::Continue {
                    redraw: self.shell.expire_notices(Instant::now()),
                },
                Event::Shutdown => LoopControl::Break {
                    reason: ShutdownReason::ShutdownEvent,
                },
            };

            match control {
                LoopControl::Break { reason } => {
                    shutdown_reason = reason;
                    break;
                }
                LoopControl::Continue { redraw } => {
                    if redraw {
                        self.redraw();
                    }
                }
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(())
    }

    fn handle_input_event(&mut self, input: InputEvent) -> LoopControl {
        match input {
            InputEvent::Key(key) => {
                let ctx = KeyContext {
                    tab: self.shell.tab(),
                    prompt_active: self.shell.prompt().is_some(),
                };
                match translate_key(&key, ctx) {
                    Some(action) => self.process_action(action),
                    None => {
                        trace!(target: "runtime", %key, "key_unbound");
                        LoopControl::Continue { redraw: false }
                    }
                }
            }
            InputEvent::Paste(text) => self.process_action(Action::Paste(text)),
            InputEvent::Resize(w, h) => {
                self.apply_size(w, h);
                LoopControl::Continue { redraw: true }
            }
        }
    }

    fn process_action(&mut self, action: Action) -> LoopControl {
        let outcome = self.shell.dispatch(action);
        if let Some(request) = outcome.io {
            let _ = self.io.submit(request);
        }
        if outcome.quit {
            info!(target: "runtime", "shutdown");
            LoopControl::Break {
                reason: ShutdownReason::ActionQuit,
            }
        } else {
            LoopControl::Continue { redraw: true }
        }
    }

    fn apply_size(&mut self, w: u16, h: u16) {
        self.size = (w, h);
        let rows = ScreenLayout::compute(w, h).body_rows();
        debug!(target: "runtime", width = w, height = h, body_rows = rows, "resize");
        self.shell.set_viewport(rows);
    }

    fn redraw(&mut self) {
        let (w, h) = self.size;
        let span = tracing::trace_span!(target: "render", "frame", width = w, height = h);
        let _e = span.enter();
        if let Err(err) = paint::compose(&self.shell, w, h).flush() {
            error!(target: "render", ?err, "frame_flush_failed");
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        info!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown_begin");
        self.tx = None;

        for handle in self.source_handles.drain(..) {
            handle.abort();
            join_task("event_source", handle, reason).await;
        }
        if let Some(shutdown) = self.input_shutdown.take() {
            shutdown.signal();
        }
        if let Some(handle) = self.input_task.take() {
            join_task("input", handle, reason).await;
        }

        info!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown_complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    let context = startup.run()?;
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());
    let mut sources = EventSources::new();
    sources.add(NoticeTicker::new(TICK_INTERVAL));
    let source_handles = sources.start_all(&tx);

    let mut runtime =
        EditorRuntime::new(context, tx, rx, input_task, input_shutdown, source_handles);
    runtime.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_accept_path_and_config() {
        let args = Args::parse_from(["marknote", "--config", "alt.toml", "notes/a.md"]);
        assert_eq!(args.path, Some(PathBuf::from("notes/a.md")));
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));

        let bare = Args::parse_from(["marknote"]);
        assert!(bare.path.is_none() && bare.config.is_none());
    }

    #[test]
    fn incoming_paths_are_made_absolute() -> Result<()> {
        let expected = LocationHandle::from(std::env::current_dir()?.join("a.md"));
        assert_eq!(incoming_handle(Path::new("a.md")), expected);
        Ok(())
    }
}
