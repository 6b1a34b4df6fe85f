/// Per-row events recorded while a batch runs
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// A job row finished; `statements` is how many it produced or executed
    RowSucceeded { statements: u64, duration_ms: u64 },
    /// A job row failed and was skipped
    RowFailed { duration_ms: u64 },
}

/// Statistics aggregated from telemetry events
#[derive(Debug, Default, Clone)]
pub struct BatchStats {
    pub rows_succeeded: usize,
    pub rows_failed: usize,
    pub statements: u64,
    pub row_durations_ms: Vec<u64>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a telemetry event
    pub fn update(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::RowSucceeded {
                statements,
                duration_ms,
            } => {
                self.rows_succeeded += 1;
                self.statements += statements;
                self.row_durations_ms.push(*duration_ms);
            }
            TelemetryEvent::RowFailed { duration_ms } => {
                self.rows_failed += 1;
                self.row_durations_ms.push(*duration_ms);
            }
        }
    }

    /// Calculate percentile from row durations
    pub fn percentile(&self, p: f64) -> Option<u64> {
        if self.row_durations_ms.is_empty() {
            return None;
        }

        let mut sorted = self.row_durations_ms.clone();
        sorted.sort_unstable();

        let index = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
        let index = index.saturating_sub(1).min(sorted.len() - 1);

        Some(sorted[index])
    }

    /// Get p50, p90, p99 percentiles
    pub fn get_percentiles(&self) -> (Option<u64>, Option<u64>, Option<u64>) {
        (
            self.percentile(50.0),
            self.percentile(90.0),
            self.percentile(99.0),
        )
    }

    /// `p50: Xms, p90: Yms, p99: Zms` once any row has been timed
    pub fn latency_summary(&self) -> Option<String> {
        match self.get_percentiles() {
            (Some(p50), Some(p90), Some(p99)) => {
                Some(format!("p50: {}ms, p90: {}ms, p99: {}ms", p50, p90, p99))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_counts() {
        let mut stats = BatchStats::new();
        stats.update(&TelemetryEvent::RowSucceeded {
            statements: 2,
            duration_ms: 10,
        });
        stats.update(&TelemetryEvent::RowFailed { duration_ms: 5 });
        stats.update(&TelemetryEvent::RowSucceeded {
            statements: 1,
            duration_ms: 30,
        });

        assert_eq!(stats.rows_succeeded, 2);
        assert_eq!(stats.rows_failed, 1);
        assert_eq!(stats.statements, 3);
    }

    #[test]
    fn test_percentiles() {
        let mut stats = BatchStats::new();
        assert_eq!(stats.get_percentiles(), (None, None, None));
        assert!(stats.latency_summary().is_none());

        for ms in 1..=100 {
            stats.update(&TelemetryEvent::RowSucceeded {
                statements: 1,
                duration_ms: ms,
            });
        }

        assert_eq!(stats.get_percentiles(), (Some(50), Some(90), Some(99)));
        assert_eq!(
            stats.latency_summary().as_deref(),
            Some("p50: 50ms, p90: 90ms, p99: 99ms")
        );
        assert_eq!(stats.percentile(0.0), Some(1));
    }
}
