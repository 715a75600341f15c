// Human-facing progress reporting
use crossterm::cursor::MoveToColumn;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};
use std::sync::Mutex;

const PREFIX: &str = "AWS Identity Center Sign in: ";
const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Sink for the messages a login run produces
///
/// Terminating the process is left to the caller; reporters only render.
pub trait StatusReporter: Send + Sync {
    fn progress(&self, message: &str);
    fn warning(&self, message: &str);
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Single-line status display on stdout
pub struct TerminalReporter<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
    frame: Mutex<usize>,
}

impl TerminalReporter {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            frame: Mutex::new(0),
        }
    }

    fn next_frame(&self) -> char {
        let mut frame = self.frame.lock().unwrap_or_else(|e| e.into_inner());
        let c = FRAMES[*frame % FRAMES.len()];
        *frame += 1;
        c
    }

    fn render(&self, line: String, finished: bool) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let result = (|| -> io::Result<()> {
            out.queue(MoveToColumn(0))?
                .queue(Clear(ClearType::CurrentLine))?
                .queue(Print(line))?;
            if finished {
                out.queue(Print("\n"))?;
            }
            out.flush()
        })();

        // A vanished reader is handled by the pipe listener
        if let Err(e) = result {
            tracing::debug!("Failed to write status line: {}", e);
        }
    }
}

impl<W: Write + Send> StatusReporter for TerminalReporter<W> {
    fn progress(&self, message: &str) {
        tracing::info!("{}", message);
        let frame = self.next_frame();
        self.render(format!("{} {}{}", frame, PREFIX, message), false);
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
        let frame = self.next_frame();
        let text = format!("Warn: {}", message).yellow();
        self.render(format!("{} {}{}", frame, PREFIX, text), false);
    }

    fn success(&self, message: &str) {
        self.render(format!("{} {}{}", "✓".green(), PREFIX, message), true);
    }

    fn failure(&self, message: &str) {
        self.render(
            format!("{} {}{}", "✗".red(), PREFIX, message.to_string().red()),
            true,
        );
    }
}

/// Reporter that keeps every message, for tests
#[cfg(test)]
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn messages(&self, kind: &str) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, kind: &'static str, message: &str) {
        self.events.lock().unwrap().push((kind, message.to_string()));
    }
}

#[cfg(test)]
impl StatusReporter for RecordingReporter {
    fn progress(&self, message: &str) {
        self.push("progress", message);
    }

    fn warning(&self, message: &str) {
        self.push("warning", message);
    }

    fn success(&self, message: &str) {
        self.push("success", message);
    }

    fn failure(&self, message: &str) {
        self.push("failure", message);
    }
}
