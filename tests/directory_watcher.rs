// tests/directory_watcher.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::event::{CreateKind, Flag, RemoveKind};
use notify::{Event, EventKind};
use seqwatch::errors::WatchError;
use seqwatch::watch::{DirectoryWatcher, EventStream, FileEvent, RawEvent, WatchBackend};

type TestResult = Result<(), Box<dyn Error>>;

/// Wait for the first event satisfying `pred`, skipping others.
async fn wait_for(
    stream: &mut EventStream,
    pred: impl Fn(&FileEvent) -> bool,
) -> Result<FileEvent, Box<dyn Error>> {
    loop {
        match stream.next().await {
            Some(Ok(event)) if pred(&event) => return Ok(event),
            Some(Ok(_)) => continue,
            Some(Err(err)) => return Err(err.into()),
            None => return Err("stream ended".into()),
        }
    }
}

/// Everything the stream yields within `window`.
async fn drain_for(stream: &mut EventStream, window: Duration) -> Vec<FileEvent> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(Ok(event))) = tokio::time::timeout_at(deadline, stream.next()).await {
        seen.push(event);
    }
    seen
}

fn canonical_tempdir() -> Result<(tempfile::TempDir, PathBuf), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    Ok((dir, root))
}

#[test]
fn register_all_covers_existing_tree() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    fs::create_dir_all(root.join("a/b/c"))?;
    fs::create_dir(root.join("d"))?;
    fs::write(root.join("a/file.txt"), "x")?;

    let mut watcher = DirectoryWatcher::new()?;
    let added = watcher.register_all(&root)?;

    assert_eq!(added, 5);
    assert_eq!(
        watcher.watched_dirs(),
        vec![
            root.clone(),
            root.join("a"),
            root.join("a/b"),
            root.join("a/b/c"),
            root.join("d"),
        ]
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    let (_other, elsewhere) = canonical_tempdir()?;
    std::os::unix::fs::symlink(&elsewhere, root.join("link"))?;

    let mut watcher = DirectoryWatcher::new()?;
    watcher.register_all(&root)?;

    assert_eq!(watcher.watched_dirs(), vec![root]);
    Ok(())
}

#[test]
fn registering_twice_is_idempotent() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;

    let mut watcher = DirectoryWatcher::new()?;
    assert!(watcher.register(&root)?);
    assert!(!watcher.register(&root)?);
    assert!(!watcher.register(root.join("."))?);
    assert_eq!(watcher.watched_dirs().len(), 1);
    Ok(())
}

#[test]
fn unregister_releases_one_directory() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    fs::create_dir(root.join("a"))?;

    let mut watcher = DirectoryWatcher::new()?;
    watcher.register_all(&root)?;

    assert!(watcher.unregister(&root.join("a")));
    assert!(!watcher.unregister(&root.join("a")));
    assert_eq!(watcher.watched_dirs(), vec![root.clone()]);

    assert!(watcher.register(root.join("a"))?);
    assert_eq!(watcher.watched_dirs().len(), 2);
    Ok(())
}

#[test]
fn missing_directory_is_unavailable() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;

    let mut watcher = DirectoryWatcher::new()?;
    let err = watcher.register(root.join("nope")).unwrap_err();
    assert!(matches!(err, WatchError::Unavailable { .. }), "got {err:?}");

    fs::write(root.join("plain.txt"), "x")?;
    let err = watcher.register(root.join("plain.txt")).unwrap_err();
    assert!(matches!(err, WatchError::Unavailable { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn empty_watcher_cannot_stream() -> TestResult {
    init_tracing();
    let watcher = DirectoryWatcher::new()?;
    let err = watcher.process_events(16).unwrap_err();
    assert_eq!(err, WatchError::NoActiveRegistrations);
    Ok(())
}

#[tokio::test]
async fn new_subdirectory_is_reported_once_and_then_watched() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;

    let mut watcher = DirectoryWatcher::new()?;
    watcher.register_all(&root)?;
    let mut stream = watcher.process_events(16)?;

    let sub = root.join("run1");
    fs::create_dir(&sub)?;
    let event = with_timeout(wait_for(&mut stream, |e| e.path() == Some(sub.as_path()))).await?;
    assert_eq!(event, FileEvent::Created(sub.clone()));

    let file = sub.join("data.txt");
    fs::write(&file, "x")?;
    with_timeout(wait_for(&mut stream, |e| e.path() == Some(file.as_path()))).await?;

    let later = drain_for(&mut stream, Duration::from_millis(300)).await;
    assert!(
        !later.contains(&FileEvent::Created(sub.clone())),
        "subdirectory reported twice: {later:?}"
    );

    let watcher = stream.cancel().ok_or("worker panicked")?;
    assert!(watcher.watched_dirs().is_empty());
    Ok(())
}

#[tokio::test]
async fn nested_tree_created_at_once_is_caught_up() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;

    let mut watcher = DirectoryWatcher::new()?;
    watcher.register_all(&root)?;
    let mut stream = watcher.process_events(64)?;

    let deep = root.join("x/y/z");
    fs::create_dir_all(&deep)?;
    fs::write(deep.join("marker.txt"), "done")?;

    let target = deep.join("marker.txt");
    let mut seen = Vec::new();
    with_timeout(async {
        while let Some(item) = stream.next().await {
            let event = item?;
            let done = event == FileEvent::Created(target.clone());
            seen.push(event);
            if done {
                break;
            }
        }
        Ok::<_, Box<dyn Error>>(())
    })
    .await?;
    seen.extend(drain_for(&mut stream, Duration::from_millis(300)).await);

    for dir in [root.join("x"), root.join("x/y"), deep.clone()] {
        let created = seen
            .iter()
            .filter(|e| **e == FileEvent::Created(dir.clone()))
            .count();
        assert_eq!(created, 1, "{dir:?} in {seen:?}");
    }
    Ok(())
}

#[tokio::test]
async fn one_event_per_change_on_doubly_registered_directory() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;

    let mut watcher = DirectoryWatcher::new()?;
    watcher.register(&root)?;
    watcher.register(&root)?;
    let mut stream = watcher.process_events(16)?;

    let file = root.join("once.txt");
    fs::File::create(&file)?;

    let mut seen = vec![with_timeout(wait_for(&mut stream, |e| e.is_created())).await?];
    seen.extend(drain_for(&mut stream, Duration::from_millis(300)).await);
    let created = seen
        .iter()
        .filter(|e| **e == FileEvent::Created(file.clone()))
        .count();
    assert_eq!(created, 1, "events: {seen:?}");
    Ok(())
}

#[tokio::test]
async fn cancelled_watcher_can_be_restarted() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;

    let mut watcher = DirectoryWatcher::new()?;
    watcher.register_all(&root)?;
    let stream = watcher.process_events(16)?;

    let mut watcher = stream.cancel().ok_or("worker panicked")?;
    assert!(watcher.watched_dirs().is_empty());

    watcher.register_all(&root)?;
    let mut stream = watcher.process_events(16)?;
    let file = root.join("again.txt");
    fs::write(&file, "x")?;
    with_timeout(wait_for(&mut stream, |e| e.path() == Some(file.as_path()))).await?;
    Ok(())
}

// Synthetic backend: records registrations, events are injected by hand.

#[derive(Clone, Default)]
struct RecordingBackend {
    watched: Arc<Mutex<Vec<PathBuf>>>,
}

impl WatchBackend for RecordingBackend {
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.watched.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError> {
        let mut watched = self.watched.lock().unwrap();
        let before = watched.len();
        watched.retain(|p| p != dir);
        if watched.len() == before {
            return Err(WatchError::Unavailable {
                path: dir.to_path_buf(),
                reason: "not watched".to_string(),
            });
        }
        Ok(())
    }
}

fn synthetic_watcher(
    root: &Path,
) -> Result<(DirectoryWatcher, std_mpsc::Sender<RawEvent>, RecordingBackend), Box<dyn Error>> {
    let backend = RecordingBackend::default();
    let (raw_tx, raw_rx) = std_mpsc::channel();
    let mut watcher = DirectoryWatcher::with_backend(Box::new(backend.clone()), raw_rx);
    watcher.register_all(root)?;
    Ok((watcher, raw_tx, backend))
}

#[tokio::test]
async fn overflow_is_reported_and_stream_continues() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    let (watcher, raw_tx, _backend) = synthetic_watcher(&root)?;
    let mut stream = watcher.process_events(16)?;

    raw_tx.send(Ok(Event::new(EventKind::Other).set_flag(Flag::Rescan)))?;
    let file = root.join("after-overflow.txt");
    raw_tx.send(Ok(
        Event::new(EventKind::Create(CreateKind::File)).add_path(file.clone())
    ))?;

    let first = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(first, FileEvent::Overflow);
    let second = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(second, FileEvent::Created(file));
    Ok(())
}

#[tokio::test]
async fn removing_the_last_directory_ends_the_stream() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    fs::create_dir(root.join("sub"))?;
    let (watcher, raw_tx, backend) = synthetic_watcher(&root)?;
    assert_eq!(backend.watched.lock().unwrap().len(), 2);
    let mut stream = watcher.process_events(16)?;

    raw_tx.send(Ok(
        Event::new(EventKind::Remove(RemoveKind::Folder)).add_path(root.clone())
    ))?;

    let deleted = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(deleted, FileEvent::Deleted(root.clone()));

    let end = with_timeout(stream.next()).await.ok_or("stream ended")?;
    assert_eq!(end, Err(WatchError::NoActiveRegistrations));
    assert!(with_timeout(stream.next()).await.is_none());
    assert!(backend.watched.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn closed_facility_ends_the_stream() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    let (watcher, raw_tx, _backend) = synthetic_watcher(&root)?;
    let mut stream = watcher.process_events(16)?;

    drop(raw_tx);
    let end = with_timeout(stream.next()).await.ok_or("stream ended")?;
    assert_eq!(end, Err(WatchError::Closed));
    Ok(())
}

#[tokio::test]
async fn interrupted_wait_ends_the_stream() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    let (watcher, raw_tx, _backend) = synthetic_watcher(&root)?;
    let mut stream = watcher.process_events(16)?;

    let interrupted = std::io::Error::from(std::io::ErrorKind::Interrupted);
    raw_tx.send(Err(notify::Error::io(interrupted)))?;

    let end = with_timeout(stream.next()).await.ok_or("stream ended")?;
    assert!(matches!(end, Err(WatchError::Interrupted(_))), "got {end:?}");
    Ok(())
}

#[tokio::test]
async fn new_directory_is_registered_before_it_is_reported() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    let (watcher, raw_tx, backend) = synthetic_watcher(&root)?;
    let mut stream = watcher.process_events(16)?;

    let sub = root.join("late");
    fs::create_dir(&sub)?;
    fs::write(sub.join("early.txt"), "x")?;
    raw_tx.send(Ok(
        Event::new(EventKind::Create(CreateKind::Folder)).add_path(sub.clone())
    ))?;

    let first = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(first, FileEvent::Created(sub.clone()));
    assert!(backend.watched.lock().unwrap().contains(&sub));

    let second = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(second, FileEvent::Created(sub.join("early.txt")));

    let watcher = stream.cancel().ok_or("worker panicked")?;
    assert!(watcher.watched_dirs().is_empty());
    assert!(backend.watched.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn late_event_for_caught_up_directory_is_not_repeated() -> TestResult {
    init_tracing();
    let (_tmp, root) = canonical_tempdir()?;
    let (watcher, raw_tx, _backend) = synthetic_watcher(&root)?;
    let mut stream = watcher.process_events(16)?;

    let sub = root.join("run");
    let inner = sub.join("lane1");
    fs::create_dir_all(&inner)?;
    raw_tx.send(Ok(
        Event::new(EventKind::Create(CreateKind::Folder)).add_path(sub.clone())
    ))?;

    let first = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(first, FileEvent::Created(sub.clone()));
    let second = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(second, FileEvent::Created(inner.clone()));

    // The OS event for the nested directory arrives after the catch-up scan.
    let file = root.join("after.txt");
    fs::write(&file, "x")?;
    raw_tx.send(Ok(
        Event::new(EventKind::Create(CreateKind::Folder)).add_path(inner.clone())
    ))?;
    raw_tx.send(Ok(
        Event::new(EventKind::Create(CreateKind::File)).add_path(file.clone())
    ))?;

    let next = with_timeout(stream.next()).await.ok_or("stream ended")??;
    assert_eq!(next, FileEvent::Created(file));
    Ok(())
}
