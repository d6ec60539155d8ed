//! Save, open, export and autosave through a real directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use myel_core::{Category, Modifiers, PointerEvent, PointerKind, Quality, Tool};
use myel_export::ExportSelection;
use myel_io::{AUTOSAVE_INTERVAL, IoError, OpenStatus, Workspace};

/// Write a 120x80 PNG with two bright discs and return its path.
fn write_image(dir: &Path, name: &str) -> PathBuf {
    let img = image::RgbaImage::from_fn(120, 80, |x, y| {
        let inside = |cx: f64| (f64::from(x) - cx).hypot(f64::from(y) - 40.0) <= 15.0;
        let v = if inside(30.0) || inside(85.0) { 220 } else { 30 };
        image::Rgba([v, v, v, 255])
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn workspace(dir: &Path) -> Workspace {
    let config = myel_core::EditorConfig {
        blur: 0,
        min_size: 50.0,
        ..myel_core::EditorConfig::default()
    };
    Workspace::with_config(dir.join("backups"), config)
}

fn select_axon(ws: &mut Workspace, x: i32, y: i32) {
    let editor = ws.editor_mut().unwrap();
    editor.set_tool(Tool::Select(Category::Axon));
    editor.pointer_event(PointerEvent::new(PointerKind::Press, x, y, Modifiers::NONE));
    editor.pointer_event(PointerEvent::new(PointerKind::Release, x, y, Modifiers::NONE));
}

#[test]
fn save_then_open_reloads_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "nerve.png");
    let mut ws = workspace(dir.path());
    ws.new_image(&image, Quality::ORIGINAL).unwrap();
    assert_eq!(ws.stem().as_deref(), Some("nerve"));
    select_axon(&mut ws, 30, 40);

    let session = dir.path().join(myel_io::session_file_name("nerve"));
    ws.save(&session).unwrap();
    assert_eq!(ws.save_current().unwrap(), session);

    let mut fresh = workspace(dir.path());
    let status = fresh.open(&session).unwrap();
    assert_eq!(status, OpenStatus::Loaded { image });
    let editor = fresh.editor().unwrap();
    assert_eq!(editor.annotations().contours.get(Category::Axon).len(), 1);
    assert_eq!(fresh.save_path(), Some(session.as_path()));
}

#[test]
fn missing_image_applies_to_the_open_one() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "a.png");
    let session = dir.path().join("s.json");
    std::fs::write(
        &session,
        serde_json::json!({
            "version": "1.3",
            "filename": "/nowhere/missing.png",
            "quality": 1.0,
            "threshold": 100,
        })
        .to_string(),
    )
    .unwrap();

    let mut empty = workspace(dir.path());
    assert!(matches!(empty.open(&session), Err(IoError::NoImage)));
    assert!(empty.editor().is_none());

    let mut ws = workspace(dir.path());
    ws.new_image(&image, Quality::ORIGINAL).unwrap();
    assert_eq!(ws.open(&session).unwrap(), OpenStatus::Applied);
    assert_eq!(ws.editor().unwrap().config().threshold, 100);
}

#[test]
fn incompatible_session_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "a.png");
    let mut ws = workspace(dir.path());
    ws.new_image(&image, Quality::ORIGINAL).unwrap();
    select_axon(&mut ws, 30, 40);

    let session = dir.path().join("old.json");
    std::fs::write(&session, r#"{"version": "0.0.1", "contours": {}}"#).unwrap();
    assert!(matches!(
        ws.open(&session),
        Err(IoError::IncompatibleVersion(Some(v))) if v == "0.0.1"
    ));
    assert_eq!(ws.editor().unwrap().annotations().contours.len(), 1);
    assert!(ws.save_path().is_none());

    std::fs::write(&session, "not json").unwrap();
    assert!(matches!(ws.open(&session), Err(IoError::OpenFailed(_))));
}

#[test]
fn export_writes_both_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "fiber.png");
    let mut ws = workspace(dir.path());
    ws.new_image(&image, Quality::ORIGINAL).unwrap();
    select_axon(&mut ws, 85, 40);

    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let paths = ws.export(&out, &ExportSelection::default()).unwrap();
    assert_eq!(paths.report, out.join("fiber-area_calculations.csv"));
    assert_eq!(paths.overlay, out.join("fiber-overlay.png"));
    let report = std::fs::read_to_string(&paths.report).unwrap();
    assert!(report.starts_with("Number,Axon Diameter,"));
    assert!(report.contains("\n1,"));
    let overlay = image::open(&paths.overlay).unwrap();
    assert_eq!((overlay.width(), overlay.height()), (120, 80));
}

#[test]
fn export_to_a_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "fiber.png");
    let mut ws = workspace(dir.path());
    ws.new_image(&image, Quality::ORIGINAL).unwrap();
    let err = ws
        .export(&dir.path().join("missing"), &ExportSelection::default())
        .unwrap_err();
    assert!(matches!(err, IoError::Io { .. }));
}

#[test]
fn autosave_waits_for_the_interval() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "nerve.png");
    let mut ws = workspace(dir.path());
    ws.new_image(&image, Quality::ORIGINAL).unwrap();

    let start = Instant::now();
    assert!(ws.autosave_tick(start).is_none());
    assert!(ws.autosave_tick(start + Duration::from_secs(60)).is_none());

    let backup = ws.autosave_tick(start + AUTOSAVE_INTERVAL).unwrap();
    assert_eq!(
        backup,
        dir.path().join("backups").join("nerve-data-backup.json")
    );
    assert!(backup.is_file());
    // The clock restarts after each backup.
    assert!(
        ws.autosave_tick(start + AUTOSAVE_INTERVAL + Duration::from_secs(1))
            .is_none()
    );
}

#[test]
fn autosave_failure_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "nerve.png");
    // A file where the backup directory should be.
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, b"").unwrap();
    let mut ws = Workspace::new(&blocker);
    ws.new_image(&image, Quality::ORIGINAL).unwrap();

    let start = Instant::now();
    ws.autosave_tick(start);
    assert!(ws.autosave_tick(start + AUTOSAVE_INTERVAL).is_none());
}
