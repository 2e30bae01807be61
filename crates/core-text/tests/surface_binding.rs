//! `TextArea` bound to a store through `SyncEngine`.

use core_model::{EditSurface, SAMPLE_DOCUMENT, SyncEngine};
use core_state::ContentStore;
use core_text::TextArea;

#[test]
fn keystrokes_flow_into_store() {
    let store = ContentStore::new();
    let engine = SyncEngine::attach(store.clone(), TextArea::new());
    assert_eq!(engine.surface().as_str(), SAMPLE_DOCUMENT);
    assert_eq!(engine.surface().cursor(), 0);

    engine.edit(|area| area.insert_str("> "));
    assert_eq!(store.get(), format!("> {SAMPLE_DOCUMENT}"));
    assert!(engine.is_dirty());
    assert_eq!(engine.surface().cursor(), 2);
}

#[test]
fn cursor_motion_does_not_touch_store() {
    let store = ContentStore::new();
    let engine = SyncEngine::attach(store.clone(), TextArea::new());
    let revision = store.revision();
    engine.with_surface_mut(|area| {
        area.move_down();
        area.move_line_end();
    });
    assert_eq!(store.revision(), revision);
    assert!(!engine.is_dirty());
}

#[test]
fn loaded_document_lands_at_top() {
    let store = ContentStore::new();
    let engine = SyncEngine::attach(store.clone(), TextArea::new());
    engine.with_surface_mut(|area| {
        area.page_down(20);
        area.scroll_into_view(2);
    });
    assert!(engine.surface().first_line() > 0);

    engine.mark_loaded("line1\nline2\n");
    let area = engine.surface();
    assert_eq!(area.text(), "line1\nline2\n");
    assert_eq!(area.cursor(), 0);
    assert_eq!(area.first_line(), 0);
}
