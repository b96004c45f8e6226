use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tracing::debug;

use crate::engine::SyncEngine;
use crate::progress::ChannelReporter;

/// Work a front end can hand to a background thread.
#[derive(Debug, Clone)]
pub enum Operation {
    Scan {
        source_dir: PathBuf,
        mapping_path: PathBuf,
    },
    Sync {
        target_dir: PathBuf,
        mapping_path: PathBuf,
        dry_run: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Status(String),
    /// Always the last event of a task.
    Finished { success: bool },
}

/// A running operation. Status lines arrive on [`TaskHandle::events`] in real
/// time, followed by exactly one [`TaskEvent::Finished`].
pub struct TaskHandle {
    events: Receiver<TaskEvent>,
    worker: JoinHandle<()>,
}

impl TaskHandle {
    pub fn events(&self) -> &Receiver<TaskEvent> {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the task ends, handing every status line to `on_status`.
    /// Returns whether the operation succeeded.
    pub fn wait_with(self, mut on_status: impl FnMut(&str)) -> bool {
        let mut success = false;
        for event in self.events.iter() {
            match event {
                TaskEvent::Status(line) => on_status(&line),
                TaskEvent::Finished { success: done } => success = done,
            }
        }
        // A panicking worker never sent a success event.
        self.worker.join().is_ok() && success
    }

    pub fn wait(self) -> bool {
        self.wait_with(|_| {})
    }
}

/// Run `operation` on a dedicated worker thread.
pub fn spawn(engine: SyncEngine, operation: Operation) -> io::Result<TaskHandle> {
    let (sender, events) = mpsc::channel();
    let done = sender.clone();

    let worker = thread::Builder::new()
        .name("structure-sync-worker".to_string())
        .spawn(move || {
            let reporter = ChannelReporter::new(sender, TaskEvent::Status);
            debug!("Worker starting {:?}", operation);
            let success = match &operation {
                Operation::Scan {
                    source_dir,
                    mapping_path,
                } => engine.scan(source_dir, mapping_path, &reporter).is_ok(),
                Operation::Sync {
                    target_dir,
                    mapping_path,
                    dry_run,
                } => engine
                    .sync(target_dir, mapping_path, *dry_run, &reporter)
                    .is_ok(),
            };
            let _ = done.send(TaskEvent::Finished { success });
        })?;

    Ok(TaskHandle { events, worker })
}
