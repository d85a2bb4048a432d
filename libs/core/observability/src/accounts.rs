//! Metrics for user account and auth-token operations.

use metrics::{counter, histogram};
use std::time::Instant;

/// Outcome label attached to operation metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }

    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Account metrics recorder
pub struct AccountMetrics;

impl AccountMetrics {
    /// Record one user operation (`create`, `update`, `list`, `get`, `delete`).
    pub fn record_user_operation(operation: &'static str, outcome: Outcome, duration_secs: f64) {
        counter!(
            "user_operations_total",
            "operation" => operation,
            "outcome" => outcome.as_str()
        )
        .increment(1);

        histogram!("user_operation_duration_seconds", "operation" => operation)
            .record(duration_secs);
    }

    pub fn record_token_issued(token_type: &str) {
        counter!("tokens_issued_total", "type" => token_type.to_string()).increment(1);
    }

    /// `result` is one of `valid`, `not_found`, `expired`.
    pub fn record_token_verification(token_type: &str, result: &'static str) {
        counter!(
            "token_verifications_total",
            "type" => token_type.to_string(),
            "result" => result
        )
        .increment(1);
    }

    pub fn record_tokens_revoked(count: u64) {
        counter!("tokens_revoked_total").increment(count);
    }

    /// Record one expired-token sweep.
    pub fn record_tokens_purged(count: u64, duration_secs: f64) {
        counter!("tokens_purged_total").increment(count);
        histogram!("token_sweep_duration_seconds").record(duration_secs);

        tracing::debug!(purged = count, duration_secs, "Expired token sweep recorded");
    }
}

/// Timer guard for user operations.
///
/// Records with [`Outcome::Failure`] when dropped without calling [`finish`](Self::finish),
/// so early returns through `?` are still counted.
pub struct OperationTimer {
    start: Instant,
    operation: &'static str,
    finished: bool,
}

impl OperationTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
            finished: false,
        }
    }

    /// Record the operation with the outcome of `result` and hand the result back.
    pub fn finish<T, E>(mut self, result: Result<T, E>) -> Result<T, E> {
        self.record(Outcome::of(&result));
        result
    }

    fn record(&mut self, outcome: Outcome) {
        if self.finished {
            return;
        }
        self.finished = true;
        AccountMetrics::record_user_operation(
            self.operation,
            outcome,
            self.start.elapsed().as_secs_f64(),
        );
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.record(Outcome::Failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    fn render(f: impl FnOnce()) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, f);
        handle.render()
    }

    #[test]
    fn test_timer_records_success_once() {
        let output = render(|| {
            let result: Result<u8, ()> = OperationTimer::start("create").finish(Ok(1));
            assert_eq!(result, Ok(1));
        });

        assert!(output.contains("user_operations_total"));
        assert!(output.contains("operation=\"create\""));
        assert!(output.contains("outcome=\"success\""));
        assert!(!output.contains("outcome=\"failure\""));
    }

    #[test]
    fn test_dropped_timer_records_failure() {
        let output = render(|| {
            let _timer = OperationTimer::start("delete");
        });

        assert!(output.contains("operation=\"delete\""));
        assert!(output.contains("outcome=\"failure\""));
    }

    #[test]
    fn test_token_counters() {
        let output = render(|| {
            AccountMetrics::record_token_issued("refresh");
            AccountMetrics::record_token_verification("refresh", "expired");
            AccountMetrics::record_tokens_purged(3, 0.01);
        });

        assert!(output.contains("tokens_issued_total{type=\"refresh\"} 1"));
        assert!(output.contains("result=\"expired\""));
        assert!(output.contains("tokens_purged_total 3"));
    }
}
