//! Performance metrics and instrumentation for the pass scheduler.

use std::time::{Duration, Instant};

/// Metrics collected during one run of the rewrite passes.
#[derive(Debug, Clone, Default)]
pub struct PassMetrics {
    /// Time spent draining the mutation queue
    pub mutate_time: Duration,

    /// Time spent in tree registration, disabled, stashed and focus passes
    pub update_time: Duration,

    /// Time spent in the layout pass
    pub layout_time: Duration,

    /// Time spent in the compose pass
    pub compose_time: Duration,

    /// Time spent in the pointer/hover pass
    pub pointer_time: Duration,

    /// Total time of the rewrite sequence
    pub total_time: Duration,

    /// Number of full rewrite sequences run
    pub rewrite_iterations: usize,

    /// Number of mutation callbacks applied
    pub mutations_applied: usize,

    /// Number of mutation callbacks dropped because their target was gone
    pub mutations_dropped: usize,

    /// Number of widgets whose layout callback ran
    pub widgets_laid_out: usize,

    /// Number of layout calls answered from the cached size
    pub layout_skips: usize,

    /// Number of widgets whose compose callback ran
    pub widgets_composed: usize,

    /// Number of widgets in the arena at the end of the run
    pub total_widgets: usize,

    /// The rerun cap was hit and remaining work was left for the next frame
    pub deferred: bool,
}

impl PassMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of layout calls that did real work (0.0 to 100.0).
    pub fn layout_dirty_percentage(&self) -> f32 {
        let total = self.widgets_laid_out + self.layout_skips;
        if total == 0 {
            0.0
        } else {
            (self.widgets_laid_out as f32 / total as f32) * 100.0
        }
    }

    /// Returns true if this run did no layout work at all.
    pub fn is_compose_only(&self) -> bool {
        self.widgets_laid_out == 0
    }

    /// Format metrics as a human-readable string.
    pub fn format_summary(&self) -> String {
        format!(
            "Rewrite: {:.2}ms x{} | Layout: {:.2}ms ({} widgets, {} cached) | Compose: {:.2}ms ({} widgets) | Mutations: {} (+{} stale){}",
            self.total_time.as_secs_f64() * 1000.0,
            self.rewrite_iterations,
            self.layout_time.as_secs_f64() * 1000.0,
            self.widgets_laid_out,
            self.layout_skips,
            self.compose_time.as_secs_f64() * 1000.0,
            self.widgets_composed,
            self.mutations_applied,
            self.mutations_dropped,
            if self.deferred { " | DEFERRED" } else { "" },
        )
    }
}

/// Helper for timing sections of pass code.
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed duration.
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_dirty_percentage() {
        let metrics = PassMetrics {
            widgets_laid_out: 1,
            layout_skips: 3,
            ..Default::default()
        };
        assert_eq!(metrics.layout_dirty_percentage(), 25.0);
        assert!(!metrics.is_compose_only());
        assert_eq!(PassMetrics::new().layout_dirty_percentage(), 0.0);
    }

    #[test]
    fn test_summary_marks_deferral() {
        let metrics = PassMetrics {
            deferred: true,
            ..Default::default()
        };
        assert!(metrics.format_summary().ends_with("DEFERRED"));
    }
}
