use std::sync::mpsc::Sender;

/// Sink for human-readable status lines.
///
/// Called synchronously from the thread running the operation, in the order
/// events happen. The CLI renders lines with indicatif, the task runner
/// forwards them over a channel. Status lines are observational only.
pub trait ProgressReporter: Send + Sync {
    fn on_status(&self, message: &str);
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn on_status(&self, _message: &str) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_status(&self, message: &str) {
        self(message)
    }
}

/// Forwards status lines into an mpsc channel, mapping each line with `wrap`.
pub struct ChannelReporter<T> {
    sender: Sender<T>,
    wrap: fn(String) -> T,
}

impl<T: Send> ChannelReporter<T> {
    pub fn new(sender: Sender<T>, wrap: fn(String) -> T) -> Self {
        Self { sender, wrap }
    }
}

impl<T: Send> ProgressReporter for ChannelReporter<T> {
    fn on_status(&self, message: &str) {
        // The receiver going away only means nobody is watching any more.
        let _ = self.sender.send((self.wrap)(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Mutex;

    #[test]
    fn test_closure_reporter_receives_lines() {
        let lines = Mutex::new(Vec::new());
        let reporter = |message: &str| lines.lock().unwrap().push(message.to_string());
        reporter.on_status("one");
        reporter.on_status("two");
        assert_eq!(*lines.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_channel_reporter_wraps_lines() {
        let (tx, rx) = mpsc::channel();
        let reporter = ChannelReporter::new(tx, |line| format!("> {line}"));
        reporter.on_status("hello");
        assert_eq!(rx.recv().unwrap(), "> hello");
    }

    #[test]
    fn test_channel_reporter_survives_closed_receiver() {
        let (tx, rx) = mpsc::channel::<String>();
        drop(rx);
        let reporter = ChannelReporter::new(tx, |line| line);
        reporter.on_status("nobody listening");
    }
}
