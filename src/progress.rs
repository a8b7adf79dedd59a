//! Progress-callback trait for per-chunk classification events.
//!
//! Inject an [`Arc<dyn ClassificationProgressCallback>`] via
//! [`crate::config::ClassificationConfigBuilder::progress_callback`] to
//! receive events as the pipeline classifies each chunk.
//!
//! # Example
//!
//! ```rust
//! use pdf_topics::{ClassificationConfig, ClassificationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     failed: AtomicUsize,
//! }
//!
//! impl ClassificationProgressCallback for CountingCallback {
//!     fn on_chunk_error(&self, chunk: usize, total: usize, error: &str) {
//!         self.failed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("chunk {chunk}/{total} failed: {error}");
//!     }
//! }
//!
//! let config = ClassificationConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { failed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it classifies each chunk.
///
/// Chunks are classified one at a time, so events for a run arrive in
/// order. The trait is still `Send + Sync` so a callback can be shared
/// with other threads (e.g. a terminal progress bar). All methods default
/// to no-ops.
pub trait ClassificationProgressCallback: Send + Sync {
    /// Called once segmentation is done, before the first request.
    fn on_run_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before a chunk's request is sent.
    ///
    /// `chunk` is 1-indexed.
    fn on_chunk_start(&self, chunk: usize, total_chunks: usize) {
        let _ = (chunk, total_chunks);
    }

    /// Called when a chunk receives a label.
    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, label: &str) {
        let _ = (chunk, total_chunks, label);
    }

    /// Called when a chunk is recorded as `Error`.
    fn on_chunk_error(&self, chunk: usize, total_chunks: usize, error: &str) {
        let _ = (chunk, total_chunks, error);
    }

    /// Called once after every chunk has been attempted.
    fn on_run_complete(&self, total_chunks: usize, classified: usize) {
        let _ = (total_chunks, classified);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ClassificationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClassificationConfig`].
pub type ProgressCallback = Arc<dyn ClassificationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl ClassificationProgressCallback for RecordingCallback {
        fn on_run_start(&self, total_chunks: usize) {
            self.events.lock().unwrap().push(format!("start {total_chunks}"));
        }

        fn on_chunk_complete(&self, chunk: usize, _total: usize, label: &str) {
            self.events.lock().unwrap().push(format!("{chunk}={label}"));
        }

        fn on_chunk_error(&self, chunk: usize, _total: usize, _error: &str) {
            self.events.lock().unwrap().push(format!("{chunk}!"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_chunk_start(1, 3);
        cb.on_chunk_complete(1, 3, "Sports");
        cb.on_chunk_error(2, 3, "timeout");
        cb.on_run_complete(3, 2);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let cb = RecordingCallback::default();
        cb.on_run_start(2);
        cb.on_chunk_start(1, 2);
        cb.on_chunk_complete(1, 2, "Politics");
        cb.on_chunk_error(2, 2, "HTTP 500");
        cb.on_run_complete(2, 1);

        let events = cb.events.lock().unwrap();
        assert_eq!(*events, vec!["start 2", "1=Politics", "2!"]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_chunk_complete(1, 10, "Economics");
    }
}
