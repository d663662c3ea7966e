use std::io::{self, Write};
use std::path::PathBuf;

use rfd::FileDialog;

use crate::app::App;
use crate::clipboard;
use crate::console::PROMPT;
use crate::upload::UploadRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Paste,
    Select,
    Quit,
    Other,
}

fn parse_choice(input: &str) -> Choice {
    match input.trim().to_lowercase().as_str() {
        "p" => Choice::Paste,
        "s" => Choice::Select,
        "q" => Choice::Quit,
        _ => Choice::Other,
    }
}

/// Runs the read-eval loop on the calling thread until the user quits or
/// input ends. Always requests shutdown on the way out, so closing the
/// menu stops the folder watcher too.
pub fn run(app: &App) {
    loop {
        app.console.with_lock(|out| {
            let _ = write!(out, "{}", PROMPT);
        });

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => {
                app.console.line("Exiting...");
                break;
            }
            Ok(_) => {}
        }

        match parse_choice(&line) {
            Choice::Paste => paste_image(app),
            Choice::Select => select_image(app),
            Choice::Quit => {
                app.console.line("Exiting...");
                break;
            }
            Choice::Other => {
                app.console
                    .lines(&["Please enter 'p', 's', or 'q'.", "Returning to menu..."]);
            }
        }
    }

    app.shutdown.request();
}

fn report_result(app: &App, result: &str) {
    let line = format!("Uploaded & copied to clipboard: {}", result);
    app.console.lines(&[line.as_str(), "Returning to menu..."]);
}

fn paste_image(app: &App) {
    match clipboard::read_image() {
        Ok(Some(bytes)) => {
            let result = app.upload_and_copy(UploadRequest::from_clipboard(bytes));
            report_result(app, &result);
        }
        Ok(None) => {
            app.console.lines(&[
                "No image found in clipboard! Copy an image (e.g., right-click > Copy Image) and try again.",
                "Returning to menu...",
            ]);
        }
        Err(err) => {
            log::warn!("Clipboard read failed: {}", err);
            app.console.lines(&[
                "Invalid image in clipboard! Copy a valid image (e.g., right-click > Copy Image) and try again.",
                "Returning to menu...",
            ]);
        }
    }
}

fn select_image(app: &App) {
    let selected = pick_file(app);
    handle_selection(app, selected);
}

/// Native file dialog rooted at the watch folder, falling back to the
/// home directory when that path is missing.
fn pick_file(app: &App) -> Option<PathBuf> {
    let initial_dir = if app.config.watch_folder.is_dir() {
        app.config.watch_folder.clone()
    } else {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    };

    FileDialog::new()
        .set_title("Select an Image")
        .set_directory(initial_dir)
        .add_filter("Image Files", &["png", "jpg", "jpeg", "gif", "bmp"])
        .add_filter("All Files", &["*"])
        .pick_file()
}

fn handle_selection(app: &App, selected: Option<PathBuf>) {
    let Some(path) = selected else {
        app.console
            .lines(&["No file selected.", "Returning to menu..."]);
        return;
    };

    match std::fs::read(&path) {
        Ok(bytes) => {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("image.png")
                .to_string();
            let result = app.upload_and_copy(UploadRequest::from_file(bytes, &filename));
            report_result(app, &result);
        }
        Err(err) => {
            let line = format!("Error opening {}: {}", path.display(), err);
            app.console.lines(&[line.as_str(), "Returning to menu..."]);
        }
    }
}
