//! Async input service: terminal events from `crossterm::EventStream` mapped
//! onto `core_events::Event` and pushed into the main loop channel.

mod keys;
mod pump;

pub use pump::InputShutdown;

use core_events::Event;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

/// Start the input pump on the current runtime.
///
/// Bracketed paste is enabled for the lifetime of the task. The returned
/// handle stops it; the task also ends on its own once the channel closes.
pub fn spawn_async_input(sender: Sender<Event>) -> (JoinHandle<()>, InputShutdown) {
    pump::spawn(sender)
}
