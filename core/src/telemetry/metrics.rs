use std::sync::Mutex;

/// Counters shared between engine stages and the embedding application.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    recomputations: usize,
    dropped_records: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                recomputations: 0,
                dropped_records: 0,
            }),
        }
    }

    pub fn record_recomputation(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.recomputations += 1;
        }
    }

    pub fn record_dropped(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.dropped_records += count;
        }
    }

    /// `(recomputations, dropped_records)`.
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.recomputations, metrics.dropped_records)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_recomputation();
        metrics.record_dropped(3);
        metrics.record_dropped(1);
        assert_eq!(metrics.snapshot(), (1, 4));
    }
}
