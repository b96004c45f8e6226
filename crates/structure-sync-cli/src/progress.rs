use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use structure_sync_core::ProgressReporter;

/// Terminal shared by spinners, status lines and log output.
///
/// Everything printed goes through [`MultiProgress::suspend`], so lines land
/// above an active spinner instead of being torn by its redraws, and are
/// still printed when stdout is not a terminal.
#[derive(Clone)]
pub struct Console {
    multi: MultiProgress,
}

impl Console {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    pub fn reporter(&self) -> CliReporter {
        CliReporter::new(self.clone())
    }

    pub fn writer(&self) -> ConsoleWriter {
        ConsoleWriter {
            multi: self.multi.clone(),
        }
    }

    fn print_line(&self, line: &str) {
        self.multi.suspend(|| println!("{}", line));
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// `io::Write` over the console, used as the stdout log layer's writer.
pub struct ConsoleWriter {
    multi: MultiProgress,
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multi.suspend(|| io::stdout().lock().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Prints status lines above a spinner that shows the latest line.
pub struct CliReporter {
    console: Console,
    bar: ProgressBar,
}

impl CliReporter {
    fn new(console: Console) -> Self {
        let bar = console.multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { console, bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
        self.console.multi.remove(&self.bar);
    }
}

impl ProgressReporter for CliReporter {
    fn on_status(&self, message: &str) {
        // Periodic counters only update the spinner; everything else is kept.
        if message.starts_with("    ") {
            self.bar.set_message(message.trim().to_string());
        } else {
            self.console.print_line(message);
            self.bar.set_message(message.to_string());
        }
    }
}

impl Drop for CliReporter {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.finish();
        }
    }
}
