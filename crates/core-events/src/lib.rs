//! Events consumed by the Marknote main loop and the tasks that produce them.
//!
//! The loop owns the content store and is single-threaded. Everything else
//! (terminal input, the notice ticker, document IO) runs as a tokio task and
//! talks to the loop only by sending an [`Event`].

use core_io::{DocumentIo, IoCompletion, IoRequest, perform};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

// One bounded channel feeds the loop. Producers await `send`, so a slow loop
// applies backpressure instead of losing events. A failed send means the loop
// is gone and the producer stops.
pub const EVENT_CHANNEL_CAP: usize = 8192;

pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static PASTE_EVENTS: AtomicU64 = AtomicU64::new(0);
pub static PASTE_BYTES: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STARTS: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_SIGNAL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_CHANNEL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_STREAM: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_ERROR: AtomicU64 = AtomicU64::new(0);
pub static IO_REQUESTS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// A document load or save finished on a blocking worker.
    Io(IoCompletion),
    /// Periodic tick; drives notice expiry.
    Tick,
    Shutdown,
}

/// A background producer started once at startup.
pub trait EventSource: Send + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;
    /// Start the task. It must end once `tx` reports the channel closed.
    fn start(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

#[derive(Default)]
pub struct EventSources {
    pending: Vec<Box<dyn EventSource>>,
}

impl EventSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: EventSource>(&mut self, source: S) {
        self.pending.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Start every pending source; a second call starts nothing.
    pub fn start_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        self.pending
            .drain(..)
            .map(|source| {
                info!(target: "runtime.events", source = source.name(), "event_source_start");
                source.start(tx.clone())
            })
            .collect()
    }
}

/// Sends `Event::Tick` every `period`. Ticks missed while the loop was busy
/// are skipped rather than replayed.
pub struct NoticeTicker {
    period: Duration,
}

impl NoticeTicker {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl EventSource for NoticeTicker {
    fn name(&self) -> &'static str {
        "notice_ticker"
    }

    fn start(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick).await.is_err() {
                    trace!(target: "runtime.events", "notice_ticker_stopped");
                    break;
                }
            }
        })
    }
}

/// Runs document requests on the blocking pool and posts each completion back
/// to the loop as `Event::Io`. No timeouts, cancellation or retries. A request
/// whose worker panics still completes, as a failure.
#[derive(Clone)]
pub struct IoWorker {
    io: Arc<dyn DocumentIo>,
    tx: Sender<Event>,
}

impl IoWorker {
    pub fn new(io: Arc<dyn DocumentIo>, tx: Sender<Event>) -> Self {
        Self { io, tx }
    }

    pub fn submit(&self, request: IoRequest) -> JoinHandle<()> {
        IO_REQUESTS.fetch_add(1, Ordering::Relaxed);
        let io = Arc::clone(&self.io);
        let tx = self.tx.clone();
        let failed = request.failed();
        tokio::spawn(async move {
            let completion =
                match tokio::task::spawn_blocking(move || perform(io.as_ref(), request)).await {
                    Ok(completion) => completion,
                    Err(err) => {
                        error!(target: "runtime.io", ?err, "io_worker_failed");
                        failed
                    }
                };
            if tx.send(Event::Io(completion)).await.is_err() {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                debug!(target: "runtime.io", "io_completion_dropped");
            }
        })
    }
}

/// Normalized input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Bracketed paste payload, raw from the terminal. Never logged verbatim; log the length.
    Paste(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }
}

/// Logical keys consumed by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 1;
        const ALT = 1 << 1;
        const SHIFT = 1 << 2;
    }
}

/// Chord notation, e.g. `Ctrl+S`, `Shift+PageDown`, `F2`.
impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CTRL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.mods.contains(flag) {
                f.write_str(name)?;
            }
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_io::{LoadFailure, LoadOrigin, LocationHandle, LocationInfo, SaveFailure};
    use std::sync::atomic::AtomicBool;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[test]
    fn key_chords_display_like_the_help_line() {
        assert_eq!(KeyEvent::ctrl('s').to_string(), "Ctrl+S");
        assert_eq!(KeyEvent::plain(KeyCode::F(2)).to_string(), "F2");
        assert_eq!(
            KeyEvent::new(KeyCode::PageDown, KeyModifiers::SHIFT | KeyModifiers::ALT).to_string(),
            "Alt+Shift+PageDown"
        );
        assert_eq!(KeyEvent::plain(KeyCode::Char(' ')).to_string(), "Space");
    }

    #[tokio::test]
    async fn ticker_ticks_until_the_channel_closes() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sources = EventSources::new();
        sources.add(NoticeTicker::new(Duration::from_millis(5)));
        assert_eq!(sources.len(), 1);
        let handles = sources.start_all(&tx);
        assert!(sources.is_empty());
        assert!(sources.start_all(&tx).is_empty());

        let first = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(matches!(first, Ok(Some(Event::Tick))));

        drop(tx);
        drop(rx);
        for handle in handles {
            let joined = timeout(Duration::from_millis(200), handle).await;
            assert!(matches!(joined, Ok(Ok(()))), "ticker did not stop");
        }
    }

    struct WatchClose(Arc<AtomicBool>);

    impl EventSource for WatchClose {
        fn name(&self) -> &'static str {
            "watch_close"
        }

        fn start(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            tokio::spawn(async move {
                tx.closed().await;
                self.0.store(true, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn sources_observe_loop_exit() {
        let (tx, rx) = mpsc::channel::<Event>(1);
        let closed = Arc::new(AtomicBool::new(false));
        let mut sources = EventSources::new();
        sources.add(WatchClose(closed.clone()));
        let handles = sources.start_all(&tx);
        drop(tx);
        drop(rx);
        for handle in handles {
            let joined = timeout(Duration::from_millis(200), handle).await;
            assert!(matches!(joined, Ok(Ok(()))));
        }
        assert!(closed.load(Ordering::SeqCst));
    }

    /// Serves one fixed document; refuses every save.
    struct OneDoc;

    impl DocumentIo for OneDoc {
        fn load(&self, _: &LocationHandle) -> Result<String, LoadFailure> {
            Ok("# one\n".into())
        }

        fn save(&self, _: &LocationHandle, _: &str) -> Result<(), SaveFailure> {
            Err(SaveFailure)
        }

        fn describe(&self, handle: &LocationHandle) -> LocationInfo {
            LocationInfo {
                media_type: None,
                display_name: core_io::fallback_display_name(handle),
            }
        }
    }

    #[tokio::test]
    async fn io_worker_posts_completions_to_the_loop() {
        let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        let worker = IoWorker::new(Arc::new(OneDoc), tx);
        let before = IO_REQUESTS.load(Ordering::Relaxed);

        let _ = worker.submit(IoRequest::Load {
            handle: LocationHandle::new("notes/one.md"),
            origin: LoadOrigin::Import,
        });
        match rx.recv().await {
            Some(Event::Io(IoCompletion::Loaded {
                display_name,
                result,
                ..
            })) => {
                assert_eq!(display_name, "one.md");
                assert_eq!(result, Ok("# one\n".to_string()));
            }
            other => panic!("unexpected {other:?}"),
        }

        let _ = worker.submit(IoRequest::Save {
            handle: LocationHandle::new("x.md"),
            content: "x".into(),
            revision: 4,
        });
        assert!(matches!(
            rx.recv().await,
            Some(Event::Io(IoCompletion::Saved { revision: 4, result: Err(SaveFailure), .. }))
        ));
        assert!(IO_REQUESTS.load(Ordering::Relaxed) >= before + 2);
    }

    /// Every operation panics inside the blocking pool.
    struct Crashing;

    impl DocumentIo for Crashing {
        fn load(&self, _: &LocationHandle) -> Result<String, LoadFailure> {
            panic!("disk on fire")
        }

        fn save(&self, _: &LocationHandle, _: &str) -> Result<(), SaveFailure> {
            panic!("disk on fire")
        }

        fn describe(&self, _: &LocationHandle) -> LocationInfo {
            LocationInfo {
                media_type: Some("text/markdown".into()),
                display_name: "ignored".into(),
            }
        }
    }

    #[tokio::test]
    async fn crashed_worker_still_reports_a_failure() {
        let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        let worker = IoWorker::new(Arc::new(Crashing), tx);

        let _ = worker.submit(IoRequest::Save {
            handle: LocationHandle::new("drafts/x.md"),
            content: "x".into(),
            revision: 9,
        });
        match rx.recv().await {
            Some(Event::Io(IoCompletion::Saved {
                display_name,
                revision,
                result,
                ..
            })) => {
                assert_eq!(display_name, "x.md");
                assert_eq!(revision, 9);
                assert_eq!(result, Err(SaveFailure));
            }
            other => panic!("unexpected {other:?}"),
        }

        let _ = worker.submit(IoRequest::Load {
            handle: LocationHandle::new("in.md"),
            origin: LoadOrigin::Import,
        });
        assert!(matches!(
            rx.recv().await,
            Some(Event::Io(IoCompletion::Loaded {
                origin: LoadOrigin::Import,
                result: Err(LoadFailure),
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn io_worker_survives_a_closed_loop() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let before = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed);
        let worker = IoWorker::new(Arc::new(OneDoc), tx);
        let handle = worker.submit(IoRequest::Load {
            handle: LocationHandle::new("a.md"),
            origin: LoadOrigin::Incoming,
        });
        assert!(handle.await.is_ok());
        assert!(CHANNEL_SEND_FAILURES.load(Ordering::Relaxed) > before);
    }
}
