//! Progress reporting contract
//!
//! The engine owns a [`ProgressTracker`] for the duration of one run. The
//! tracker is the only writer of the completed counter, which keeps it
//! monotone and bounded by the total.

use mailsweep_domain::ProgressSnapshot;

/// Receives progress updates synchronously from the engine loop.
pub trait ProgressObserver {
    fn on_progress(&mut self, snapshot: ProgressSnapshot);
}

impl<F> ProgressObserver for F
where
    F: FnMut(ProgressSnapshot),
{
    fn on_progress(&mut self, snapshot: ProgressSnapshot) {
        self(snapshot);
    }
}

/// Observer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _snapshot: ProgressSnapshot) {}
}

#[derive(Debug)]
pub struct ProgressTracker<O> {
    completed: usize,
    total: usize,
    observer: O,
}

impl<O: ProgressObserver> ProgressTracker<O> {
    pub fn new(total: usize, observer: O) -> Self {
        Self { completed: 0, total, observer }
    }

    /// Emit the initial `(0, total)` snapshot.
    pub fn start(&mut self) {
        self.emit();
    }

    /// Record one success and emit the new snapshot.
    pub fn advance(&mut self) {
        if self.completed < self.total {
            self.completed += 1;
        }
        self.emit();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.completed, self.total)
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    fn emit(&mut self) {
        let snapshot = self.snapshot();
        self.observer.on_progress(snapshot);
    }
}
