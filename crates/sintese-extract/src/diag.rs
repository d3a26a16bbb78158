//! Progress/diagnostics stream.
//!
//! An ordered sequence of human-readable lines pushed to an optional
//! callback — observability only, never required for correctness. Lines
//! are mirrored onto `tracing` so library consumers without a callback
//! still see them.

use std::sync::Arc;
use tracing::info;

/// Sink for human-readable progress and warning lines.
#[derive(Clone, Default)]
pub struct Diagnostics {
    sink: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl Diagnostics {
    /// Diagnostics with a callback receiving every line in order.
    pub fn new(sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            sink: Some(Arc::new(sink)),
        }
    }

    /// Diagnostics that only log via `tracing`.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Push one line.
    pub fn report(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        info!("{line}");
        if let Some(sink) = &self.sink {
            sink(line);
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
