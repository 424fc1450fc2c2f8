use super::classifier::{WatchPatterns, is_temp_file, relevant_paths};
use super::debouncer::debounce;
use super::*;
use crate::artifact::FileWaiter;
use crate::config::test_site_config;
use crate::stage::BoxFuture;
use crate::stage::style::{StyleError, StyleJob};
use crate::stage::{FileInclude, StyleCompiler};
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::time::sleep;

// ============================================================================
// debounce
// ============================================================================

fn counting_debounce(
    delay: Duration,
) -> (mpsc::Sender<PathBuf>, Arc<Mutex<Vec<Vec<PathBuf>>>>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(64);
    let batches = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&batches);
    let handle = tokio::spawn(debounce(rx, delay, move |changes| {
        let sink = Arc::clone(&sink);
        async move { sink.lock().push(changes) }
    }));
    (tx, batches, handle)
}

#[tokio::test(start_paused = true)]
async fn test_burst_collapses_to_one_rebuild() {
    let (tx, batches, handle) = counting_debounce(Duration::from_millis(300));

    for i in 0..5 {
        tx.send(PathBuf::from(format!("/site/src/pages/{i}.html"))).await.unwrap();
        sleep(Duration::from_millis(50)).await;
    }
    tx.send(PathBuf::from("/site/src/pages/0.html")).await.unwrap();
    sleep(Duration::from_millis(400)).await;

    let batches = batches.lock().clone();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 5);

    drop(tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_new_change_restarts_timer() {
    let (tx, batches, _handle) = counting_debounce(Duration::from_millis(200));

    tx.send(PathBuf::from("/a.scss")).await.unwrap();
    sleep(Duration::from_millis(150)).await;
    tx.send(PathBuf::from("/b.scss")).await.unwrap();

    // 250ms after the first change, but only 100ms after the second.
    sleep(Duration::from_millis(100)).await;
    assert!(batches.lock().is_empty());

    sleep(Duration::from_millis(150)).await;
    assert_eq!(batches.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_separate_windows_rebuild_separately() {
    let (tx, batches, _handle) = counting_debounce(Duration::from_millis(200));

    tx.send(PathBuf::from("/a.scss")).await.unwrap();
    sleep(Duration::from_millis(300)).await;
    tx.send(PathBuf::from("/a.scss")).await.unwrap();
    sleep(Duration::from_millis(300)).await;

    assert_eq!(batches.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rebuilds_never_overlap() {
    let (tx, rx) = mpsc::channel(64);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let runs = Arc::new(AtomicUsize::new(0));
    let (r, p, n) = (Arc::clone(&running), Arc::clone(&peak), Arc::clone(&runs));

    tokio::spawn(debounce(rx, Duration::from_millis(100), move |_| {
        let (r, p, n) = (Arc::clone(&r), Arc::clone(&p), Arc::clone(&n));
        async move {
            let now = r.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(500)).await;
            r.fetch_sub(1, Ordering::SeqCst);
            n.fetch_add(1, Ordering::SeqCst);
        }
    }));

    tx.send(PathBuf::from("/a")).await.unwrap();
    sleep(Duration::from_millis(200)).await;
    // Arrives while the first rebuild is still running.
    tx.send(PathBuf::from("/b")).await.unwrap();
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_closed_channel_flushes_pending_window() {
    let (tx, batches, handle) = counting_debounce(Duration::from_millis(300));
    tx.send(PathBuf::from("/a")).await.unwrap();
    drop(tx);
    handle.await.unwrap();
    assert_eq!(batches.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_forward_does_not_wait_on_busy_subscription() {
    let (tx, rx) = mpsc::channel(4);
    let runs = Arc::new(AtomicUsize::new(0));
    let n = Arc::clone(&runs);

    tokio::spawn(debounce(rx, Duration::from_millis(100), move |_| {
        let n = Arc::clone(&n);
        async move {
            sleep(Duration::from_millis(1000)).await;
            n.fetch_add(1, Ordering::SeqCst);
        }
    }));

    assert!(forward(&tx, PathBuf::from("/site/src/styles/a.scss")));
    // The first rebuild is running and nobody drains the queue.
    sleep(Duration::from_millis(200)).await;
    let queued = (0..100)
        .filter(|i| forward(&tx, PathBuf::from(format!("/site/src/styles/{i}.scss"))))
        .count();
    assert_eq!(queued, 4);

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_forward_to_stopped_subscription() {
    let (tx, rx) = mpsc::channel::<PathBuf>(4);
    drop(rx);
    assert!(!forward(&tx, PathBuf::from("/a.html")));
}

// ============================================================================
// classification
// ============================================================================

#[test]
fn test_classify_by_subscription() {
    let dir = TempDir::new().unwrap();
    let config = test_site_config(dir.path());
    let patterns = WatchPatterns::new(&config);
    let paths = &config.paths;

    let cases: Vec<(PathBuf, Vec<Subscription>)> = vec![
        (paths.scss.src.join("styles.scss"), vec![Subscription::Styles]),
        (paths.scss.src.join("base/_reset.scss"), vec![Subscription::Styles]),
        (config.root_document_src(), vec![Subscription::Markup]),
        (paths.html.src.join("about.html"), vec![Subscription::Markup]),
        (paths.html.src.join("drafts/old.html"), vec![]),
        (paths.templates_dir().join("nav/header.html"), vec![Subscription::Markup]),
        (paths.public.src.join("img/logo.png"), vec![Subscription::Assets]),
        (paths.public.src.join("fonts/a.woff2"), vec![Subscription::Assets]),
        (paths.js.src.join("lib/app.js"), vec![Subscription::Assets]),
        (config.favicon_src(), vec![Subscription::Assets]),
        (paths.public.src.join("robots.txt"), vec![]),
        (paths.src.join("notes.md"), vec![]),
    ];
    for (path, expected) in cases {
        assert_eq!(patterns.classify(&path), expected, "{}", path.display());
    }
}

#[test]
fn test_assets_exclude_style_sources() {
    let dir = TempDir::new().unwrap();
    let mut config = test_site_config(dir.path());
    config.paths.scss.src = config.paths.public.src.join("img/styles");
    let patterns = WatchPatterns::new(&config);

    assert_eq!(
        patterns.classify(&config.paths.scss.src.join("a.scss")),
        vec![Subscription::Styles]
    );
    assert!(patterns.classify(&config.paths.scss.src.join("a.png")).is_empty());
}

#[test]
fn test_roots_drop_nested() {
    let dir = TempDir::new().unwrap();
    let config = test_site_config(dir.path());
    let roots = WatchPatterns::new(&config).roots();
    // `src` covers pages, styles, scripts and templates; `public` covers
    // fonts, images and the favicon.
    assert_eq!(roots, vec![config.paths.public.src.clone(), config.paths.src.clone()]);
}

#[test]
fn test_temp_files_ignored() {
    for name in ["a.swp", "a.html~", ".#a.html", "4913", "a.tmp", ".DS_Store"] {
        assert!(is_temp_file(Path::new(name)), "{name}");
    }
    assert!(!is_temp_file(Path::new("a.html")));
}

#[test]
fn test_metadata_events_ignored() {
    use notify::event::{DataChange, MetadataKind, ModifyKind};
    use notify::{Event, EventKind};

    let metadata = Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)))
        .add_path(PathBuf::from("/site/src/index.html"));
    assert!(relevant_paths(&metadata).is_empty());

    let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
        .add_path(PathBuf::from("/site/src/index.html"));
    assert!(relevant_paths(&access).is_empty());

    let data = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any)))
        .add_path(PathBuf::from("/site/src/index.html"))
        .add_path(PathBuf::from("/site/src/.index.html.swp"));
    assert_eq!(relevant_paths(&data), vec![PathBuf::from("/site/src/index.html")]);
}

// ============================================================================
// rebuild actions
// ============================================================================

#[derive(Default)]
struct RecordingSink {
    signals: Mutex<Vec<String>>,
}

impl ReloadSink for RecordingSink {
    fn reload_styles(&self, path: &str) {
        self.signals.lock().push(format!("css:{path}"));
    }

    fn reload_page(&self) {
        self.signals.lock().push("page".into());
    }
}

/// Writes the output unless the entry is named `broken.scss`.
struct ScriptedCompiler;

impl StyleCompiler for ScriptedCompiler {
    fn compile<'a>(&'a self, job: &'a StyleJob) -> BoxFuture<'a, Result<(), StyleError>> {
        Box::pin(async move {
            if job.input.ends_with("broken.scss") {
                return Err(StyleError::Syntax {
                    message: "expected \";\"".into(),
                    location: Default::default(),
                });
            }
            fs::write(&job.output, "a{}").map_err(|e| StyleError::Io(job.output.clone(), e))
        })
    }
}

fn orchestrator(root: &Path) -> Orchestrator {
    let config = test_site_config(root);
    fs::create_dir_all(&config.paths.scss.src).unwrap();
    fs::create_dir_all(&config.paths.src).unwrap();
    fs::write(config.root_document_src(), "<p>@@language</p>").unwrap();
    Orchestrator::with_collaborators(
        Arc::new(config),
        Arc::new(ScriptedCompiler),
        Arc::new(FileInclude),
    )
    .unwrap()
    .with_waiter(FileWaiter::new(2, Duration::from_millis(1)))
}

#[tokio::test]
async fn test_style_rebuild_swaps_stylesheet() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(dir.path());
    let config = Arc::clone(orchestrator.config());
    fs::write(config.paths.scss.src.join("styles.scss"), "").unwrap();

    let sink = RecordingSink::default();
    rebuild(Subscription::Styles, &orchestrator, &sink, &[]).await;
    assert_eq!(*sink.signals.lock(), vec!["css:styles.css".to_string()]);
}

#[tokio::test]
async fn test_style_rebuild_without_primary_output_reloads_page() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(dir.path());
    let config = Arc::clone(orchestrator.config());
    fs::write(config.paths.scss.src.join("other.scss"), "").unwrap();

    let sink = RecordingSink::default();
    rebuild(Subscription::Styles, &orchestrator, &sink, &[]).await;
    assert_eq!(*sink.signals.lock(), vec!["page".to_string()]);
}

#[tokio::test]
async fn test_failed_rebuild_sends_no_signal() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(dir.path());
    let config = Arc::clone(orchestrator.config());
    fs::write(config.paths.scss.src.join("broken.scss"), "").unwrap();

    let sink = RecordingSink::default();
    rebuild(Subscription::Styles, &orchestrator, &sink, &[]).await;
    assert!(sink.signals.lock().is_empty());
}

#[tokio::test]
async fn test_markup_rebuild_reloads_page() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(dir.path());
    let config = Arc::clone(orchestrator.config());

    let sink = RecordingSink::default();
    rebuild(Subscription::Markup, &orchestrator, &sink, &[config.root_document_src()]).await;
    assert_eq!(*sink.signals.lock(), vec!["page".to_string()]);
    assert_eq!(fs::read_to_string(config.root_document_out()).unwrap(), "<p>ko</p>");
}
