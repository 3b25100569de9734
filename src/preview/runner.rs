//! Asynchronous preview execution with latest-wins publication.
//!
//! Every request bumps a generation counter. The task serving a request publishes its
//! result into a single-slot `watch` channel only if its generation is still the newest,
//! and readers additionally check the generation and entry index before using a result.
//! Superseded tasks are aborted; for commands this drops the child process future, which
//! kills the child.

use super::{command, PreviewContent, PreviewResult, PreviewSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct PreviewRunner {
    source: PreviewSource,
    generation: Arc<AtomicU64>,
    tx: Arc<watch::Sender<Option<PreviewResult>>>,
    rx: watch::Receiver<Option<PreviewResult>>,
    task: Option<JoinHandle<()>>,
    requested: Option<usize>,
}

impl PreviewRunner {
    pub fn new(source: PreviewSource) -> Self {
        let (tx, rx) = watch::channel(None);
        Self {
            source,
            generation: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
            rx,
            task: None,
            requested: None,
        }
    }

    /// Entry index of the most recent request.
    pub fn requested(&self) -> Option<usize> {
        self.requested
    }

    /// Request a preview of entry `index` with the given argument.
    ///
    /// Repeating the request for the entry already being previewed is a no-op, so the
    /// caller may request on every redraw.
    pub fn request(&mut self, index: usize, argument: &str) {
        if self.requested == Some(index) {
            return;
        }
        let generation = self.supersede();
        self.requested = Some(index);
        log::debug!("preview request #{} for entry {}", generation, index);

        let source = self.source.clone();
        let argument = argument.to_string();
        let latest = Arc::clone(&self.generation);
        let tx = Arc::clone(&self.tx);

        self.task = Some(tokio::spawn(async move {
            let content = produce(source, argument).await;
            if latest.load(Ordering::SeqCst) == generation {
                tx.send_replace(Some(PreviewResult {
                    index,
                    generation,
                    content,
                }));
            }
        }));
    }

    /// Forget the current request; used when the highlighted entry has no preview.
    pub fn clear(&mut self) {
        if self.requested.is_some() {
            self.supersede();
            self.requested = None;
        }
    }

    /// The published result, if it belongs to the newest request for entry `index`.
    pub fn current(&self, index: Option<usize>) -> Option<PreviewResult> {
        let index = index?;
        let published = self.rx.borrow();
        published
            .as_ref()
            .filter(|result| {
                result.index == index
                    && result.generation == self.generation.load(Ordering::SeqCst)
            })
            .cloned()
    }

    /// Wait until a new result has been published.
    pub async fn changed(&mut self) {
        // The sender lives in `self`, so the channel never closes while we wait.
        if self.rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    fn supersede(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(None);
        generation
    }
}

impl Drop for PreviewRunner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn produce(source: PreviewSource, argument: String) -> PreviewContent {
    match source {
        PreviewSource::Command(template) => command::run(template.render(&argument)).await,
        PreviewSource::Converter(converter) => {
            let converted =
                tokio::task::spawn_blocking(move || converter.convert(&argument)).await;
            match converted {
                Ok(Ok(text)) => PreviewContent::Text(text),
                Ok(Err(message)) => PreviewContent::Error(message),
                Err(err) => {
                    log::warn!("preview converter failed: {}", err);
                    PreviewContent::Error(format!("preview converter failed: {}", err))
                }
            }
        }
    }
}
