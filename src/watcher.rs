use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::app::App;
use crate::console::PROMPT;
use crate::upload::UploadRequest;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// How often the event loop re-checks the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Grace period for the writing program to finish flushing the file.
/// A heuristic, not a completion guarantee.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

fn is_image_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Watches the configured folder until shutdown is requested. A missing
/// folder stops the watcher, not the process.
pub fn run(app: &App) {
    let folder = app.config.watch_folder.clone();

    if !folder.is_dir() {
        app.console.line(&format!(
            "Error: {} does not exist. Cannot start folder watcher.",
            folder.display()
        ));
        return;
    }

    let (tx, rx) = channel::<Result<notify::Event, notify::Error>>();
    let mut watcher = match RecommendedWatcher::new(tx, notify::Config::default()) {
        Ok(watcher) => watcher,
        Err(err) => {
            log::warn!("Failed to create folder watcher: {}", err);
            app.console.line("Error: Cannot start folder watcher.");
            return;
        }
    };

    if let Err(err) = watcher.watch(&folder, RecursiveMode::NonRecursive) {
        log::warn!("Failed to watch {}: {}", folder.display(), err);
        app.console.line("Error: Cannot start folder watcher.");
        return;
    }

    log::info!("Watching {} for new images", folder.display());

    while app.shutdown.is_running() {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => {
                if matches!(event.kind, EventKind::Create(_)) {
                    for path in &event.paths {
                        handle_created(app, path);
                    }
                }
            }
            Ok(Err(err)) => log::warn!("Watch error: {}", err),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let _ = watcher.unwatch(&folder);
    log::info!("Folder watcher stopped");
}

fn handle_created(app: &App, path: &Path) {
    if path.is_dir() || !is_image_file(path) {
        return;
    }

    // Let the writer finish, and skip the upload entirely when shutdown
    // arrives during the wait.
    if !app.shutdown.sleep(SETTLE_DELAY) {
        return;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            app.console
                .line(&format!("Error reading {}: {}", path.display(), err));
            return;
        }
    };

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image.png")
        .to_string();

    let result = app.upload_and_copy(UploadRequest::from_file(bytes, &filename));

    // The result line interrupts a partial prompt line, so it gets its
    // own leading newline; the prompt is restored inside the same
    // message when the menu is waiting on input.
    app.console.with_lock(|out| {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Uploaded & copied to clipboard: {} (from folder watcher)",
            result
        );
        if app.config.enable_menu {
            let _ = write!(out, "{}", PROMPT);
        }
    });
}
