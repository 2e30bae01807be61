//! Terminal event pump.
//!
//! One task drains a crossterm event stream, keeps the events the shell can
//! use and forwards them into the main loop channel until it is told to stop,
//! the channel closes, or the stream ends or fails.

use crate::keys::map_key_event;
use core_events::{
    ASYNC_INPUT_STARTS, ASYNC_INPUT_STOP_CHANNEL, ASYNC_INPUT_STOP_ERROR, ASYNC_INPUT_STOP_SIGNAL,
    ASYNC_INPUT_STOP_STREAM, CHANNEL_SEND_FAILURES, Event, InputEvent, KEYPRESS_TOTAL, PASTE_BYTES,
    PASTE_EVENTS,
};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event as TermEvent, EventStream};
use crossterm::execute;
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tracing::{Instrument, debug, info, trace, warn};

/// Asks the pump to stop at its next await point.
#[derive(Clone, Debug)]
pub struct InputShutdown {
    notify: Arc<Notify>,
}

impl InputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StopReason {
    Signal,
    ChannelClosed,
    StreamEnded,
    StreamError(io::ErrorKind),
}

impl StopReason {
    fn as_str(&self) -> &'static str {
        match self {
            StopReason::Signal => "shutdown_signal",
            StopReason::ChannelClosed => "channel_closed",
            StopReason::StreamEnded => "stream_ended",
            StopReason::StreamError(_) => "stream_error",
        }
    }

    fn record(&self) {
        let counter = match self {
            StopReason::Signal => &ASYNC_INPUT_STOP_SIGNAL,
            StopReason::ChannelClosed => &ASYNC_INPUT_STOP_CHANNEL,
            StopReason::StreamEnded => &ASYNC_INPUT_STOP_STREAM,
            StopReason::StreamError(kind) => {
                warn!(target: "input.thread", error_kind = ?kind, "input_stream_error");
                &ASYNC_INPUT_STOP_ERROR
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub(crate) fn spawn(sender: Sender<Event>) -> (JoinHandle<()>, InputShutdown) {
    let notify = Arc::new(Notify::new());
    let shutdown = InputShutdown {
        notify: notify.clone(),
    };
    let span = tracing::debug_span!(target: "input.thread", "input_pump");
    let handle = tokio::spawn(
        async move {
            bracketed_paste(true);
            pump(EventStream::new(), sender, notify).await;
            bracketed_paste(false);
        }
        .instrument(span),
    );
    (handle, shutdown)
}

fn bracketed_paste(on: bool) {
    let result = if on {
        execute!(io::stdout(), EnableBracketedPaste)
    } else {
        execute!(io::stdout(), DisableBracketedPaste)
    };
    if let Err(e) = result {
        debug!(target: "input.paste", on, ?e, "bracketed_paste_toggle_failed");
    }
}

/// Terminal events the shell understands; focus, mouse and unmapped keys drop out.
pub(crate) fn translate(event: TermEvent) -> Option<InputEvent> {
    match event {
        TermEvent::Key(key) => map_key_event(&key).map(InputEvent::Key),
        TermEvent::Resize(w, h) => Some(InputEvent::Resize(w, h)),
        TermEvent::Paste(text) => Some(InputEvent::Paste(text)),
        _ => None,
    }
}

/// Count and trace a forwarded event. Paste payloads are logged by size only.
pub(crate) fn note(event: &InputEvent) {
    match event {
        InputEvent::Key(key) => {
            KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
            trace!(target: "input.event", %key, "key");
        }
        InputEvent::Resize(w, h) => trace!(target: "input.event", w, h, "resize"),
        InputEvent::Paste(text) => {
            PASTE_EVENTS.fetch_add(1, Ordering::Relaxed);
            PASTE_BYTES.fetch_add(text.len() as u64, Ordering::Relaxed);
            trace!(target: "input.paste", paste_len = text.len(), "paste_forward");
        }
    }
}

pub(crate) async fn pump<S>(mut stream: S, sender: Sender<Event>, stop: Arc<Notify>) -> StopReason
where
    S: Stream<Item = io::Result<TermEvent>> + Unpin,
{
    ASYNC_INPUT_STARTS.fetch_add(1, Ordering::Relaxed);
    info!(target: "input.thread", "async_input_task_started");

    let reason = loop {
        let next = tokio::select! {
            biased;
            _ = stop.notified() => None,
            next = stream.next() => Some(next),
        };
        let event = match next {
            None => break StopReason::Signal,
            Some(None) => break StopReason::StreamEnded,
            Some(Some(Err(err))) => break StopReason::StreamError(err.kind()),
            Some(Some(Ok(event))) => event,
        };
        let Some(input) = translate(event) else {
            continue;
        };
        note(&input);
        if sender.send(Event::Input(input)).await.is_err() {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            break StopReason::ChannelClosed;
        }
    };

    reason.record();
    info!(target: "input.thread", reason = reason.as_str(), "async_input_task_stopped");
    reason
}
