use super::controller::MenuController;
use super::messages::LoopEvent;
use super::terminal::TerminalSession;
use crate::error::{MenuError, Result};
use crate::input::raw::DEFAULT_POLL_INTERVAL_MS;
use crate::input::{spawn_input_thread, KeyDecoder};
use crate::preview::{PreviewResult, PreviewRunner};
use crate::render::{PreviewPane, Renderer};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// How often the terminal size is checked for changes.
const RESIZE_POLL_MS: u64 = 100;

/// Sets the reader thread's shutdown flag on every exit path of the loop.
struct ShutdownOnDrop(Arc<AtomicBool>);

impl Drop for ShutdownOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Drive `controller` until it exits, drawing every state change into `session`.
pub async fn run_event_loop(
    controller: &mut MenuController<'_>,
    renderer: &Renderer,
    session: &mut TerminalSession,
    mut preview: Option<&mut PreviewRunner>,
    escape_timeout: Duration,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let input_thread = spawn_input_thread(
        session.reader()?,
        tx,
        Arc::clone(&shutdown),
        Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
    );
    let stop = ShutdownOnDrop(shutdown);

    let mut decoder = KeyDecoder::new();
    let mut escape_deadline: Option<Instant> = None;
    let mut size = session.size();
    let mut resize = tokio::time::interval(Duration::from_millis(RESIZE_POLL_MS));
    resize.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        sync_preview(controller, preview.as_deref_mut());
        draw(controller, renderer, session, preview.as_deref(), size)?;
        if controller.is_exited() {
            break;
        }

        let event = tokio::select! {
            bytes = rx.recv() => match bytes {
                Some(bytes) => LoopEvent::Input(bytes),
                None => LoopEvent::InputClosed,
            },
            _ = wait_for_escape(escape_deadline) => LoopEvent::EscapeTimeout,
            _ = wait_for_preview(preview.as_deref_mut()) => LoopEvent::PreviewReady,
            _ = resize.tick() => LoopEvent::Tick,
        };

        match event {
            LoopEvent::Input(bytes) => {
                for key in decoder.feed(&bytes) {
                    controller.handle_key(key);
                    if controller.is_exited() {
                        break;
                    }
                }
                escape_deadline = decoder
                    .is_pending()
                    .then(|| Instant::now() + escape_timeout);
            }
            LoopEvent::InputClosed => {
                return Err(MenuError::io(
                    "reading keys",
                    io::Error::new(io::ErrorKind::UnexpectedEof, "terminal input closed"),
                ));
            }
            LoopEvent::EscapeTimeout => {
                escape_deadline = None;
                if let Some(key) = decoder.flush() {
                    controller.handle_key(key);
                }
            }
            LoopEvent::PreviewReady => {}
            LoopEvent::Tick => {
                let current = session.size();
                if current != size {
                    log::debug!("terminal resized to {:?}", current);
                    size = current;
                    session.invalidate()?;
                }
            }
        }
    }

    drop(stop);
    // The reader notices the flag within one poll interval; joining keeps it from
    // consuming keystrokes meant for whatever runs after the menu.
    if !matches!(
        tokio::task::spawn_blocking(move || input_thread.join()).await,
        Ok(Ok(()))
    ) {
        log::warn!("input thread did not shut down cleanly");
    }
    Ok(())
}

/// Point the preview runner at the highlighted entry.
fn sync_preview(controller: &MenuController<'_>, preview: Option<&mut PreviewRunner>) {
    let Some(runner) = preview else {
        return;
    };
    let current = controller.current_index();
    match current.and_then(|index| {
        controller.entries()[index]
            .preview_argument()
            .map(|argument| (index, argument))
    }) {
        Some((index, argument)) => runner.request(index, argument),
        None => runner.clear(),
    }
}

fn draw(
    controller: &mut MenuController<'_>,
    renderer: &Renderer,
    session: &mut TerminalSession,
    preview: Option<&PreviewRunner>,
    size: (u16, u16),
) -> Result<()> {
    let current = controller.current_index();
    let published: Option<PreviewResult> = preview.and_then(|runner| runner.current(current));
    let wanted = preview.is_some()
        && current
            .and_then(|index| controller.entries()[index].preview_argument())
            .is_some();
    let pane = match (&published, wanted) {
        (_, false) => PreviewPane::Hidden,
        (Some(result), true) => PreviewPane::Ready(&result.content),
        (None, true) => PreviewPane::Loading,
    };

    let metrics = renderer.layout(&controller.render_input(pane, size));
    controller.set_viewport_height(metrics.entry_rows);
    let frame = renderer.render(
        &controller.render_input(pane, size),
        session.capabilities(),
    );
    session.draw(&frame)
}

async fn wait_for_escape(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn wait_for_preview(preview: Option<&mut PreviewRunner>) {
    match preview {
        Some(runner) => runner.changed().await,
        None => std::future::pending().await,
    }
}
