//! Catalog hot reload.
//!
//! Watches the catalog directory and, once a changed file has been quiet for
//! the debounce window, rebuilds its catalog and swaps it into the registry.
//! A file that fails to load leaves the previous catalog in place.

use crate::loader::CatalogLoader;
use crate::registry::CatalogRegistry;
use crate::{I18nError, LanguageTag, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of handling one changed catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// The catalog was rebuilt and published
    Reloaded {
        language: LanguageTag,
        path: PathBuf,
        generation: u64,
    },
    /// The file could not be loaded; the previous catalog stays
    Failed { path: PathBuf, error: String },
}

/// Builder for a running catalog watch.
pub struct CatalogWatcher {
    registry: Arc<CatalogRegistry>,
    loader: CatalogLoader,
    debounce: Duration,
}

impl CatalogWatcher {
    pub fn new(registry: Arc<CatalogRegistry>, loader: CatalogLoader) -> Self {
        Self {
            registry,
            loader,
            debounce: Duration::from_millis(250),
        }
    }

    /// Quiet period before a changed file is reloaded.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching. Must be called from within a Tokio runtime.
    ///
    /// Watching stops when the returned handle is dropped.
    pub fn start(self) -> Result<WatchHandle> {
        let runtime = Handle::try_current().map_err(|_| I18nError::NoRuntime)?;

        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<PathBuf>();
        let (event_tx, event_rx) = mpsc::channel(64);

        let filter = self.loader.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) => {
                    for path in event.paths {
                        if filter.is_catalog_path(&path) {
                            let _ = raw_tx.send(path);
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Catalog watcher error: {}", e),
            },
            Config::default(),
        )?;

        watcher.watch(self.loader.dir(), RecursiveMode::Recursive)?;
        info!(dir = %self.loader.dir().display(), "Watching catalogs for changes");

        let task = runtime.spawn(debounce_loop(
            self.registry,
            self.loader,
            self.debounce,
            raw_rx,
            event_tx,
        ));

        Ok(WatchHandle {
            _watcher: watcher,
            events: event_rx,
            task,
        })
    }
}

async fn debounce_loop(
    registry: Arc<CatalogRegistry>,
    loader: CatalogLoader,
    debounce: Duration,
    mut raw_rx: mpsc::UnboundedReceiver<PathBuf>,
    event_tx: mpsc::Sender<CatalogEvent>,
) {
    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        tokio::select! {
            path = raw_rx.recv() => {
                match path {
                    Some(path) => {
                        pending.insert(path, Instant::now());
                    }
                    None => break,
                }
            }
            _ = tokio::time::sleep(debounce), if !pending.is_empty() => {
                let ready: Vec<PathBuf> = pending
                    .iter()
                    .filter(|(_, seen)| seen.elapsed() >= debounce)
                    .map(|(path, _)| path.clone())
                    .collect();

                for path in ready {
                    pending.remove(&path);
                    debug!(path = %path.display(), "Catalog changed");

                    let event = match registry.reload_file(&loader, &path) {
                        Ok(catalog) => CatalogEvent::Reloaded {
                            language: catalog.language().clone(),
                            path,
                            generation: registry.load().generation(),
                        },
                        Err(e) => CatalogEvent::Failed {
                            path,
                            error: e.to_string(),
                        },
                    };

                    // nobody listening is fine; the swap already happened
                    let _ = event_tx.try_send(event);
                }
            }
        }
    }

    debug!("Catalog watcher stopped");
}

/// A running watch. Dropping it stops watching.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    events: mpsc::Receiver<CatalogEvent>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Wait for the next reload outcome.
    pub async fn next_event(&mut self) -> Option<CatalogEvent> {
        self.events.recv().await
    }

    /// Stop watching and wait for the reload task to finish.
    pub async fn stop(self) {
        let WatchHandle { _watcher, task, .. } = self;
        drop(_watcher);
        task.abort();
        let _ = task.await;
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn hello(registry: &CatalogRegistry, lang: &str) -> Option<String> {
        let tag = LanguageTag::parse(lang).unwrap();
        let snapshot = registry.load();
        let entry = snapshot.catalog(&tag)?.lookup("Hello", None)?;
        entry.singular().map(|s| s.to_string())
    }

    #[test]
    fn test_start_requires_runtime() {
        let dir = TempDir::new().unwrap();
        let watcher = CatalogWatcher::new(Arc::new(CatalogRegistry::new()), CatalogLoader::new(dir.path()));
        assert!(matches!(watcher.start(), Err(I18nError::NoRuntime)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_dir_fails() {
        let watcher = CatalogWatcher::new(
            Arc::new(CatalogRegistry::new()),
            CatalogLoader::new("/definitely/not/here"),
        );
        assert!(matches!(watcher.start(), Err(I18nError::WatchError(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reload_on_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fr.po");
        fs::write(&path, "msgid \"Hello\"\nmsgstr \"Bonjour\"\n").unwrap();

        let loader = CatalogLoader::new(dir.path());
        let registry = Arc::new(CatalogRegistry::from_catalogs(loader.load_all().unwrap()));

        let mut handle = CatalogWatcher::new(Arc::clone(&registry), loader)
            .debounce(Duration::from_millis(50))
            .start()
            .unwrap();

        fs::write(&path, "msgid \"Hello\"\nmsgstr \"Salut\"\n").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), handle.next_event())
            .await
            .expect("reload event")
            .expect("channel open");

        assert!(matches!(event, CatalogEvent::Reloaded { ref language, .. } if language.language() == "fr"));
        assert_eq!(hello(&registry, "fr").as_deref(), Some("Salut"));

        handle.stop().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_broken_file_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("de.po");
        fs::write(&path, "msgid \"Hello\"\nmsgstr \"Hallo\"\n").unwrap();

        let loader = CatalogLoader::new(dir.path());
        let registry = Arc::new(CatalogRegistry::from_catalogs(loader.load_all().unwrap()));

        let mut handle = CatalogWatcher::new(Arc::clone(&registry), loader)
            .debounce(Duration::from_millis(50))
            .start()
            .unwrap();

        fs::write(&path, [0xffu8, 0xfe, 0xfd]).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), handle.next_event())
            .await
            .expect("reload event")
            .expect("channel open");

        assert!(matches!(event, CatalogEvent::Failed { .. }));
        assert_eq!(hello(&registry, "de").as_deref(), Some("Hallo"));
    }
}
