use anyhow::Result;

use crate::clipboard;
use crate::config::Config;
use crate::console::Console;
use crate::shutdown::Shutdown;
use crate::upload::{UploadRequest, Uploader};

/// Everything the menu and the watcher thread share.
pub struct App {
    pub config: Config,
    pub console: Console,
    pub shutdown: Shutdown,
    pub uploader: Uploader,
}

impl App {
    pub fn new(config: Config, console: Console) -> Result<Self> {
        let uploader = Uploader::new(&config)?;

        Ok(Self {
            config,
            console,
            shutdown: Shutdown::new(),
            uploader,
        })
    }

    /// Uploads and copies the outcome to the clipboard. Upload errors
    /// become the copied text as well.
    pub fn upload_and_copy(&self, request: UploadRequest) -> String {
        let text = match self.uploader.upload(&request) {
            Ok(link) => link,
            Err(err) => err.to_string(),
        };

        clipboard::write_text(&text);
        text
    }
}
