//! Per-run validation statistics, grounded in
//! `original_source/TravSHACL/utils/ValidationStats.py`: target/rule counts
//! and per-shape timing, written out as `stats.txt`.

use std::fmt::Write as _;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ShapeTiming {
    pub shape_name: String,
    pub interleave: Duration,
    pub saturation: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationStats {
    pub targets_total: u64,
    pub targets_valid: u64,
    pub targets_violated: u64,
    pub queries_issued: u64,
    pub rule_number_max: usize,
    pub total_rule_number: usize,
    pub timings: Vec<ShapeTiming>,
    log: Vec<String>,
}

impl ValidationStats {
    pub fn new() -> Self {
        ValidationStats::default()
    }

    pub fn record_query(&mut self) {
        self.queries_issued += 1;
    }

    pub fn record_classification(&mut self, valid: bool) {
        self.targets_total += 1;
        if valid {
            self.targets_valid += 1;
        } else {
            self.targets_violated += 1;
        }
    }

    pub fn record_shape_timing(&mut self, shape_name: impl Into<String>, interleave: Duration, saturation: Duration) {
        self.timings.push(ShapeTiming {
            shape_name: shape_name.into(),
            interleave,
            saturation,
        });
    }

    pub fn record_rule_numbers(&mut self, live: usize, total: usize) {
        self.rule_number_max = self.rule_number_max.max(live);
        self.total_rule_number = total;
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message.into());
    }

    /// Renders the per-shape trace as CSV: one row per shape naming its
    /// interleave/saturation timings, in evaluation order.
    pub fn write_trace_csv(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "shape,interleave_ms,saturation_ms");
        for timing in &self.timings {
            let _ = writeln!(
                out,
                "{},{},{}",
                timing.shape_name,
                timing.interleave.as_millis(),
                timing.saturation.as_millis()
            );
        }
        out
    }

    /// Renders the human-readable `stats.txt` body.
    pub fn write_all_stats(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "targets: {} ({} valid, {} violated)", self.targets_total, self.targets_valid, self.targets_violated);
        let _ = writeln!(out, "queries issued: {}", self.queries_issued);
        let _ = writeln!(out, "max live rule count: {}", self.rule_number_max);
        let _ = writeln!(out, "total rules grounded: {}", self.total_rule_number);
        for timing in &self.timings {
            let _ = writeln!(
                out,
                "shape {}: interleave {:?}, saturation {:?}",
                timing.shape_name, timing.interleave, timing.saturation
            );
        }
        for line in &self.log {
            let _ = writeln!(out, "{}", line);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_classification_splits_valid_and_violated() {
        let mut stats = ValidationStats::new();
        stats.record_classification(true);
        stats.record_classification(false);
        assert_eq!(stats.targets_total, 2);
        assert_eq!(stats.targets_valid, 1);
        assert_eq!(stats.targets_violated, 1);
    }

    #[test]
    fn write_all_stats_includes_query_count() {
        let mut stats = ValidationStats::new();
        stats.record_query();
        stats.record_query();
        assert!(stats.write_all_stats().contains("queries issued: 2"));
    }

    #[test]
    fn write_trace_csv_has_one_row_per_shape() {
        let mut stats = ValidationStats::new();
        stats.record_shape_timing("A", Duration::from_millis(5), Duration::from_millis(2));
        stats.record_shape_timing("B", Duration::from_millis(1), Duration::from_millis(0));
        let csv = stats.write_trace_csv();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("A,5,2"));
        assert!(csv.contains("B,1,0"));
    }
}
