//! Shell driven end to end against the filesystem backend.

mod common;

use common::*;
use core_actions::Action;
use core_io::{FsDocumentIo, IoCompletion, IoRequest, perform};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

fn run(io: &FsDocumentIo, request: Option<IoRequest>) -> IoCompletion {
    let request = request.expect("dispatch should produce an io request");
    perform(io, request)
}

#[test]
fn import_edit_save_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("in.md"), "line1\r\nline2")?;
    let io = FsDocumentIo::new(dir.path());
    let mut shell = shell();

    let _ = shell.dispatch(Action::Import);
    type_prompt(&mut shell, "in.md");
    let completion = run(&io, shell.dispatch(Action::PromptSubmit).io);
    shell.complete_io(completion);
    assert_eq!(shell.store().get(), "line1\nline2\n");
    assert!(!shell.save_visible());

    type_text(&mut shell, "# ");
    assert!(shell.save_visible());
    let _ = shell.dispatch(Action::Save);
    clear_prompt(&mut shell);
    type_prompt(&mut shell, "out");
    let completion = run(&io, shell.dispatch(Action::PromptSubmit).io);
    shell.complete_io(completion);

    assert_eq!(
        std::fs::read_to_string(dir.path().join("out.md"))?,
        "# line1\nline2\n"
    );
    assert!(!shell.engine().is_dirty());
    assert_eq!(
        notice_messages(&shell),
        vec!["in.md imported".to_string(), "Saved".to_string()]
    );
    Ok(())
}

#[test]
fn saving_into_missing_directory_fails_and_stays_dirty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let io = FsDocumentIo::new(dir.path().join("missing"));
    let mut shell = shell();
    type_text(&mut shell, "x");
    let _ = shell.dispatch(Action::Save);
    let completion = run(&io, shell.dispatch(Action::PromptSubmit).io);
    shell.complete_io(completion);
    assert!(shell.engine().is_dirty());
    assert_eq!(notice_messages(&shell), vec!["Save failed".to_string()]);
    Ok(())
}

#[test]
fn importing_non_markdown_is_rejected_without_reading() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("pic.png"), [0u8, 159, 146, 150])?;
    let io = FsDocumentIo::new(dir.path());
    let mut shell = shell();
    let before = shell.store().get();
    let _ = shell.dispatch(Action::Import);
    type_prompt(&mut shell, "pic.png");
    let completion = run(&io, shell.dispatch(Action::PromptSubmit).io);
    assert!(matches!(completion, IoCompletion::Rejected { .. }));
    shell.complete_io(completion);
    assert_eq!(shell.store().get(), before);
    assert_eq!(
        notice_messages(&shell),
        vec!["pic.png is not a Markdown file".to_string()]
    );
    Ok(())
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl<'a> Write for LockedWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

#[test]
fn failed_save_logs_under_shell_targets() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: buffer.clone(),
        })
        .finish();

    with_default(subscriber, || {
        let mut shell = shell();
        type_text(&mut shell, "x");
        shell.complete_io(IoCompletion::Saved {
            handle: "a.md".into(),
            display_name: "a.md".into(),
            revision: shell.store().revision(),
            result: Err(core_io::SaveFailure),
        });
    });

    let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(out.contains("WARN shell.io:"), "{out}");
    assert!(out.contains("document_save_failed"));
    assert!(out.contains("WARN shell.notice:"));
}
