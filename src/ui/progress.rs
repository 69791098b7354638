//! ui::progress
//!
//! Transfer progress as `tracing` events.
//!
//! One debug event is emitted each time a transfer crosses a quarter of its
//! declared length. Transfers without a content length log only their start.
//! Per-transfer state is dropped when the transfer finishes, whatever the
//! outcome.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::remote::{FetchProgress, FetchRequest, ProgressObserver};

/// Percent step between events.
const STEP: u8 = 25;

/// Logs download progress in coarse steps.
#[derive(Debug, Default)]
pub struct LogProgress {
    last: Mutex<HashMap<(String, String), u8>>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a progress update and return the step to log, if any.
    fn advance(&self, request: &FetchRequest, progress: FetchProgress) -> Option<u8> {
        let key = (request.identifier.clone(), request.path.clone());
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let step = match progress.percent() {
            Some(percent) => percent - percent % STEP,
            None if progress.received == 0 => 0,
            None => return None,
        };

        let logged = match last.get(&key) {
            Some(prev) if *prev >= step => None,
            _ => Some(step),
        };

        if logged.is_some() {
            last.insert(key, step);
        }
        logged
    }

    fn forget(&self, request: &FetchRequest) {
        let key = (request.identifier.clone(), request.path.clone());
        self.last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key);
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, request: &FetchRequest, progress: FetchProgress) {
        if let Some(step) = self.advance(request, progress) {
            tracing::debug!(
                identifier = %request.identifier,
                path = %request.path,
                received = progress.received,
                total = progress.total,
                "fetch {}%",
                step
            );
        }
    }

    fn on_finished(&self, request: &FetchRequest) {
        self.forget(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(received: u64, total: Option<u64>) -> FetchProgress {
        FetchProgress { received, total }
    }

    #[test]
    fn logs_each_quarter_once() {
        let progress = LogProgress::new();
        let request = FetchRequest::new("o", "a");

        let steps: Vec<u8> = [0, 10, 25, 30, 50, 74, 75, 99, 100]
            .iter()
            .filter_map(|r| progress.advance(&request, at(*r, Some(100))))
            .collect();

        assert_eq!(steps, vec![0, 25, 50, 75, 100]);
    }

    #[test]
    fn unknown_length_logs_start_only() {
        let progress = LogProgress::new();
        let request = FetchRequest::new("o", "a");

        assert_eq!(progress.advance(&request, at(0, None)), Some(0));
        assert_eq!(progress.advance(&request, at(512, None)), None);
    }

    #[test]
    fn finished_transfers_are_forgotten() {
        let progress = LogProgress::new();
        let done = FetchRequest::new("o", "a");
        let failed = FetchRequest::new("o", "b");
        let unsized_body = FetchRequest::new("o", "c");

        progress.on_progress(&done, at(10, Some(10)));
        progress.on_progress(&failed, at(3, Some(10)));
        progress.on_progress(&unsized_body, at(0, None));
        assert_eq!(progress.last.lock().unwrap().len(), 3);

        for request in [&done, &failed, &unsized_body] {
            progress.on_finished(request);
        }
        assert!(progress.last.lock().unwrap().is_empty());
    }

    #[test]
    fn repeated_fetch_logs_again_after_finish() {
        let progress = LogProgress::new();
        let request = FetchRequest::new("o", "a");

        assert_eq!(progress.advance(&request, at(10, Some(10))), Some(100));
        progress.on_finished(&request);
        assert_eq!(progress.advance(&request, at(0, Some(10))), Some(0));
    }
}
