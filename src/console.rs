use std::io::Write;
use std::sync::{Arc, Mutex};

pub const PROMPT: &str = "Press 'p' to paste, 's' to select, or 'q' to quit: ";

/// Serialized terminal sink shared by the menu and the watcher thread.
/// A message is one `with_lock` call, however many lines it writes.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::with_sink(Box::new(std::io::stdout()))
    }

    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Runs `action` with exclusive access to the terminal, so output
    /// from the other thread cannot land inside the message.
    pub fn with_lock<R>(&self, action: impl FnOnce(&mut dyn Write) -> R) -> R {
        // Keep printing even if a previous holder panicked mid-message.
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        let result = action(sink.as_mut());
        let _ = sink.flush();
        result
    }

    pub fn line(&self, text: &str) {
        self.with_lock(|out| {
            let _ = writeln!(out, "{}", text);
        });
    }

    pub fn lines(&self, lines: &[&str]) {
        self.with_lock(|out| {
            for line in lines {
                let _ = writeln!(out, "{}", line);
            }
        });
    }
}
