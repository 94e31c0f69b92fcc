use std::sync::Arc;

/// The progress of a chunked operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// The number of chunks completed.
    pub progress: usize,
    /// The total number of chunks.
    pub queue_size: usize,
}

/// A progress callback.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Options for array retrieve and store operations.
///
/// The progress callback is called with zero progress before any chunk is processed, then once after each chunk completes.
#[derive(Clone, Default)]
pub struct ArrayOptions {
    progress_callback: Option<ProgressCallback>,
    concurrent_target: Option<usize>,
}

impl std::fmt::Debug for ArrayOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayOptions")
            .field("progress_callback", &self.progress_callback.is_some())
            .field("concurrent_target", &self.concurrent_target)
            .finish()
    }
}

impl ArrayOptions {
    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(
        mut self,
        callback: impl Fn(ProgressUpdate) + Send + Sync + 'static,
    ) -> Self {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Set the number of chunks processed concurrently by async operations.
    ///
    /// Defaults to the [chunk concurrent limit](crate::config::Config#chunk-concurrent-limit).
    #[must_use]
    pub fn with_concurrent_target(mut self, concurrent_target: usize) -> Self {
        self.concurrent_target = Some(concurrent_target);
        self
    }

    /// The number of chunks processed concurrently by async operations.
    #[must_use]
    pub fn concurrent_target(&self) -> usize {
        self.concurrent_target
            .unwrap_or_else(|| crate::config::global_config().chunk_concurrent_limit())
            .max(1)
    }

    pub(crate) fn progress(&self, progress: usize, queue_size: usize) {
        if let Some(callback) = &self.progress_callback {
            callback(ProgressUpdate {
                progress,
                queue_size,
            });
        }
    }
}
