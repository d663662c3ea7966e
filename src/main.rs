use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use app::App;
use console::Console;

mod app;
mod clipboard;
mod config;
mod console;
mod menu;
mod shutdown;
mod upload;
mod watcher;

fn main() {
    // The terminal belongs to the serialized console, so logs go to a
    // file only.
    fern::Dispatch::new()
        .level(log::LevelFilter::Info)
        .chain(fern::log_file("imgup.log").expect("Failed to open log file"))
        .apply()
        .expect("Failed to initialize logger");

    let config = config::find_parse_config();

    let app = Arc::new(App::new(config, Console::stdout()).expect("Failed to initialize uploader"));

    {
        let console = app.console.clone();
        let shutdown = app.shutdown.clone();
        ctrlc::set_handler(move || {
            console.with_lock(|out| {
                let _ = writeln!(out);
                let _ = writeln!(out, "Exiting...");
            });
            shutdown.request();
            std::process::exit(0);
        })
        .expect("Failed to set interrupt handler");
    }

    if app.config.enable_menu && !app.config.watch_folder.is_dir() {
        app.console.line(&format!(
            "Warning: {} does not exist. File dialog will default to home directory.",
            app.config.watch_folder.display()
        ));
    }

    let watcher_thread = if app.config.enable_watcher {
        let watcher_app = app.clone();
        Some(
            std::thread::Builder::new()
                .name("folder-watcher".to_string())
                .spawn(move || watcher::run(&watcher_app))
                .expect("Failed to spawn watcher thread"),
        )
    } else {
        None
    };

    if app.config.enable_menu {
        menu::run(&app);
    } else if app.config.enable_watcher {
        // Nothing to do on this thread; wait for Ctrl-C.
        while app.shutdown.sleep(Duration::from_secs(1)) {}
    } else {
        app.console
            .line("No modes enabled. Enable the menu or the folder watcher in imgup.toml.");
    }

    app.shutdown.request();

    if let Some(thread) = watcher_thread {
        let _ = thread.join();
    }
}
