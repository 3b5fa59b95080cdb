// src/utils/spinner.rs
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DELAY: Duration = Duration::from_millis(100);

// Terminal busy indicator. Purely cosmetic: it runs on its own thread,
// repaints one line, and has no effect on the operation it decorates.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    line_width: usize,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        // frame, space, message, trailing ellipsis
        let line_width = message.chars().count() + 5;

        let handle = {
            let running = Arc::clone(&running);
            let message = message.to_string();
            thread::spawn(move || {
                let mut frame = 0;
                while running.load(Ordering::SeqCst) {
                    print!("\r{} {}...", FRAMES[frame], message);
                    let _ = io::stdout().flush();
                    frame = (frame + 1) % FRAMES.len();
                    thread::sleep(FRAME_DELAY);
                }
            })
        };

        Self {
            running,
            handle: Some(handle),
            line_width,
        }
    }

    // Stop the animation and clear its line
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        print!("\r{}\r", " ".repeat(self.line_width));
        let _ = io::stdout().flush();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.halt();
        }
    }
}
